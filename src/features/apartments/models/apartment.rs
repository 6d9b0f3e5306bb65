use serde::Serialize;

/// An apartment tenants can file reports for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Apartment {
    pub id: String,
    pub name: String,
}

/// Fixed set of apartments known to this deployment
#[derive(Debug, Clone)]
pub struct ApartmentDirectory {
    apartments: Vec<Apartment>,
}

impl ApartmentDirectory {
    pub fn from_roster(roster: &[(&str, &str)]) -> Self {
        let apartments = roster
            .iter()
            .map(|(id, name)| Apartment {
                id: id.to_string(),
                name: name.to_string(),
            })
            .collect();

        Self { apartments }
    }

    pub fn all(&self) -> &[Apartment] {
        &self.apartments
    }

    pub fn get(&self, id: &str) -> Option<&Apartment> {
        self.apartments.iter().find(|a| a.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Display name for `id`, falling back to a generic label for ids that
    /// only appear in stored data.
    pub fn name_of(&self, id: &str) -> String {
        self.get(id)
            .map(|a| a.name.clone())
            .unwrap_or_else(|| format!("Apartment {}", id))
    }
}
