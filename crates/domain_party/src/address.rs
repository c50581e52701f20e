//! Physical addresses

use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::PartyId;

use crate::collection::Keyed;
use crate::keys::PhysicalAddressId;

/// Physical address type codes with structural requirements
pub mod address_types {
    pub const BUILDING: &str = "building";
    pub const COMPLEX: &str = "complex";
    pub const FARM: &str = "farm";
    pub const INTERNATIONAL: &str = "international";
    pub const SITE: &str = "site";
    pub const STREET: &str = "street";
    pub const UNSTRUCTURED: &str = "unstructured";
}

/// A physical address of a party
///
/// A party holds at most one address per role (residential, correspondence,
/// business, ...). Which of the structured fields are required depends on
/// the address type; see [`PhysicalAddress::structure_errors`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PhysicalAddress {
    pub party_id: PartyId,
    /// Code from the physical address role catalogue
    #[validate(length(min = 1, max = 30))]
    pub role: String,
    /// Code from the physical address type catalogue
    #[validate(length(min = 1, max = 30))]
    pub address_type: String,
    #[validate(length(max = 100))]
    pub building_name: Option<String>,
    #[validate(length(max = 20))]
    pub building_floor: Option<String>,
    #[validate(length(max = 100))]
    pub complex_name: Option<String>,
    #[validate(length(max = 30))]
    pub complex_unit_number: Option<String>,
    #[validate(length(max = 100))]
    pub farm_name: Option<String>,
    #[validate(length(max = 50))]
    pub farm_number: Option<String>,
    #[validate(length(max = 100))]
    pub line1: Option<String>,
    #[validate(length(max = 100))]
    pub line2: Option<String>,
    #[validate(length(max = 100))]
    pub line3: Option<String>,
    #[validate(length(max = 100))]
    pub site_block: Option<String>,
    #[validate(length(max = 30))]
    pub site_number: Option<String>,
    #[validate(length(max = 100))]
    pub street_name: Option<String>,
    #[validate(length(max = 30))]
    pub street_number: Option<String>,
    #[validate(length(max = 100))]
    pub suburb: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub city: String,
    #[validate(length(max = 50))]
    pub region: Option<String>,
    #[validate(length(max = 30))]
    pub postal_code: Option<String>,
    /// ISO 3166-1 alpha-2 country code
    #[validate(length(equal = 2))]
    pub country: String,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

impl PhysicalAddress {
    /// Creates an address of the given type with no structured fields set
    pub fn new(
        party_id: PartyId,
        role: impl Into<String>,
        address_type: impl Into<String>,
        city: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            party_id,
            role: role.into(),
            address_type: address_type.into(),
            building_name: None,
            building_floor: None,
            complex_name: None,
            complex_unit_number: None,
            farm_name: None,
            farm_number: None,
            line1: None,
            line2: None,
            line3: None,
            site_block: None,
            site_number: None,
            street_name: None,
            street_number: None,
            suburb: None,
            city: city.into(),
            region: None,
            postal_code: None,
            country: country.into(),
            latitude: None,
            longitude: None,
        }
    }

    /// Creates a street address
    pub fn street(
        party_id: PartyId,
        role: impl Into<String>,
        street_number: impl Into<String>,
        street_name: impl Into<String>,
        city: impl Into<String>,
        postal_code: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        let mut address = Self::new(party_id, role, address_types::STREET, city, country);
        address.street_number = Some(street_number.into());
        address.street_name = Some(street_name.into());
        address.postal_code = Some(postal_code.into());
        address
    }

    /// Lists the structural fields missing for this address's type
    ///
    /// Unknown address types are not checked here; the type code itself is
    /// validated against reference data.
    pub fn structure_errors(&self) -> Vec<String> {
        let required: Vec<(&str, &Option<String>)> = match self.address_type.as_str() {
            address_types::BUILDING => vec![
                ("building_name", &self.building_name),
                ("street_name", &self.street_name),
            ],
            address_types::COMPLEX => vec![
                ("complex_name", &self.complex_name),
                ("complex_unit_number", &self.complex_unit_number),
                ("street_name", &self.street_name),
            ],
            address_types::FARM => vec![("farm_number", &self.farm_number)],
            address_types::INTERNATIONAL | address_types::UNSTRUCTURED => {
                vec![("line1", &self.line1)]
            }
            address_types::SITE => vec![
                ("site_block", &self.site_block),
                ("site_number", &self.site_number),
            ],
            address_types::STREET => vec![
                ("street_number", &self.street_number),
                ("street_name", &self.street_name),
            ],
            _ => Vec::new(),
        };

        required
            .into_iter()
            .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
            .map(|(field, _)| format!("A {} address requires {}", self.address_type, field))
            .collect()
    }

    /// Formats the address for display, one component per line
    pub fn format(&self) -> String {
        let mut lines = Vec::new();

        if let (Some(unit), Some(complex)) = (&self.complex_unit_number, &self.complex_name) {
            lines.push(format!("{} {}", unit, complex));
        }
        if let Some(building) = &self.building_name {
            match &self.building_floor {
                Some(floor) => lines.push(format!("{}, Floor {}", building, floor)),
                None => lines.push(building.clone()),
            }
        }
        match (&self.farm_name, &self.farm_number) {
            (Some(name), Some(number)) => lines.push(format!("{} {}", name, number)),
            (None, Some(number)) => lines.push(format!("Farm {}", number)),
            (Some(name), None) => lines.push(name.clone()),
            (None, None) => {}
        }
        if let (Some(block), Some(number)) = (&self.site_block, &self.site_number) {
            lines.push(format!("{} {}", block, number));
        }
        for line in [&self.line1, &self.line2, &self.line3].into_iter().flatten() {
            lines.push(line.clone());
        }
        match (&self.street_number, &self.street_name) {
            (Some(number), Some(name)) => lines.push(format!("{} {}", number, name)),
            (None, Some(name)) => lines.push(name.clone()),
            _ => {}
        }
        if let Some(suburb) = &self.suburb {
            lines.push(suburb.clone());
        }
        let city_line = match (&self.region, &self.postal_code) {
            (Some(region), Some(code)) => format!("{}, {} {}", self.city, region, code),
            (None, Some(code)) => format!("{} {}", self.city, code),
            (Some(region), None) => format!("{}, {}", self.city, region),
            (None, None) => self.city.clone(),
        };
        lines.push(city_line);
        lines.push(self.country.clone());
        lines.join("\n")
    }
}

impl Keyed for PhysicalAddress {
    type Key = PhysicalAddressId;

    fn key(&self) -> Self::Key {
        PhysicalAddressId::new(self.party_id, &self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_street_address_format() {
        let mut address = PhysicalAddress::street(
            PartyId::new(),
            "residential",
            "21",
            "Main Road",
            "Cape Town",
            "8001",
            "ZA",
        );
        address.suburb = Some("Gardens".to_string());
        address.region = Some("Western Cape".to_string());

        assert_eq!(
            address.format(),
            "21 Main Road\nGardens\nCape Town, Western Cape 8001\nZA"
        );
        assert!(address.structure_errors().is_empty());
    }

    #[test]
    fn test_structure_errors_by_type() {
        let address = PhysicalAddress::new(
            PartyId::new(),
            "business",
            address_types::COMPLEX,
            "Johannesburg",
            "ZA",
        );
        let errors = address.structure_errors();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.contains("complex_unit_number")));

        let farm = PhysicalAddress::new(PartyId::new(), "residential", address_types::FARM, "Paarl", "ZA");
        assert_eq!(farm.structure_errors().len(), 1);
    }

    #[test]
    fn test_key_is_party_and_role() {
        let party_id = PartyId::new();
        let a = PhysicalAddress::new(party_id, "residential", address_types::STREET, "Durban", "ZA");
        let b = PhysicalAddress::new(party_id, "residential", address_types::FARM, "Paarl", "ZA");
        assert_eq!(a.key(), b.key());
    }
}
