//! Identity documents and tax numbers

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::PartyId;

use crate::collection::Keyed;
use crate::keys::{IdentityDocumentId, TaxNumberId};

/// An identity document held by a party
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct IdentityDocument {
    pub party_id: PartyId,
    /// Code from the identity document type catalogue
    #[validate(length(min = 1, max = 30))]
    pub document_type: String,
    /// ISO 3166-1 alpha-2 code of the issuing country
    #[validate(length(equal = 2))]
    pub country_of_issue: String,
    pub date_of_issue: Option<NaiveDate>,
    pub date_of_expiry: Option<NaiveDate>,
    #[validate(length(min = 1, max = 30))]
    pub number: String,
}

impl IdentityDocument {
    pub fn new(
        party_id: PartyId,
        document_type: impl Into<String>,
        country_of_issue: impl Into<String>,
        number: impl Into<String>,
    ) -> Self {
        Self {
            party_id,
            document_type: document_type.into(),
            country_of_issue: country_of_issue.into(),
            date_of_issue: None,
            date_of_expiry: None,
            number: number.into(),
        }
    }

    pub fn issued_on(mut self, date_of_issue: NaiveDate) -> Self {
        self.date_of_issue = Some(date_of_issue);
        self
    }

    pub fn expires_on(mut self, date_of_expiry: NaiveDate) -> Self {
        self.date_of_expiry = Some(date_of_expiry);
        self
    }

    /// Checks if the document has expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_on(Utc::now().date_naive())
    }

    pub fn is_expired_on(&self, date: NaiveDate) -> bool {
        self.date_of_expiry.is_some_and(|expiry| expiry < date)
    }

    /// Issue and expiry dates are in order, when both are present
    pub fn has_consistent_dates(&self) -> bool {
        match (self.date_of_issue, self.date_of_expiry) {
            (Some(issued), Some(expires)) => issued <= expires,
            _ => true,
        }
    }
}

impl Keyed for IdentityDocument {
    type Key = IdentityDocumentId;

    fn key(&self) -> Self::Key {
        IdentityDocumentId::new(
            self.party_id,
            &self.document_type,
            &self.country_of_issue,
            self.date_of_issue,
        )
    }
}

/// A tax number issued to a party by a country's revenue service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct TaxNumber {
    pub party_id: PartyId,
    /// Code from the tax number type catalogue
    #[validate(length(min = 1, max = 30))]
    pub tax_number_type: String,
    #[validate(length(equal = 2))]
    pub country_of_issue: String,
    #[validate(length(min = 1, max = 30))]
    pub number: String,
}

impl TaxNumber {
    pub fn new(
        party_id: PartyId,
        tax_number_type: impl Into<String>,
        country_of_issue: impl Into<String>,
        number: impl Into<String>,
    ) -> Self {
        Self {
            party_id,
            tax_number_type: tax_number_type.into(),
            country_of_issue: country_of_issue.into(),
            number: number.into(),
        }
    }
}

impl Keyed for TaxNumber {
    type Key = TaxNumberId;

    fn key(&self) -> Self::Key {
        TaxNumberId::new(self.party_id, &self.tax_number_type, &self.country_of_issue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_document_expiry() {
        let document = IdentityDocument::new(PartyId::new(), "passport", "ZA", "A01234567")
            .issued_on(date(2015, 3, 1))
            .expires_on(date(2025, 2, 28));

        assert!(!document.is_expired_on(date(2025, 2, 28)));
        assert!(document.is_expired_on(date(2025, 3, 1)));
        assert!(document.has_consistent_dates());
    }

    #[test]
    fn test_document_without_expiry_never_expires() {
        let document = IdentityDocument::new(PartyId::new(), "za_id_book", "ZA", "8001015009087");
        assert!(!document.is_expired());
    }

    #[test]
    fn test_inconsistent_dates() {
        let document = IdentityDocument::new(PartyId::new(), "passport", "GB", "123")
            .issued_on(date(2020, 1, 1))
            .expires_on(date(2019, 1, 1));
        assert!(!document.has_consistent_dates());
    }
}
