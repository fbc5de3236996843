#![forbid(unsafe_code)]

pub mod ids {
    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    pub struct FacilityId(String);

    impl FacilityId {
        pub fn as_str(&self) -> &str {
            &self.0
        }

        pub fn into_string(self) -> String {
            self.0
        }

        pub fn try_new(value: impl Into<String>) -> Result<Self, FacilityIdError> {
            let value = value.into();
            let trimmed = value.trim();
            validate_facility_id(trimmed)?;
            Ok(Self(trimmed.to_string()))
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum FacilityIdError {
        Empty,
        TooLong,
        InvalidChar { ch: char, index: usize },
    }

    impl FacilityIdError {
        pub fn message(&self) -> &'static str {
            match self {
                Self::Empty => "facility id must not be empty",
                Self::TooLong => "facility id is too long",
                Self::InvalidChar { .. } => "facility id contains an invalid character",
            }
        }
    }

    fn validate_facility_id(value: &str) -> Result<(), FacilityIdError> {
        if value.is_empty() {
            return Err(FacilityIdError::Empty);
        }
        if value.len() > 64 {
            return Err(FacilityIdError::TooLong);
        }
        for (index, ch) in value.chars().enumerate() {
            if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_') {
                continue;
            }
            return Err(FacilityIdError::InvalidChar { ch, index });
        }
        Ok(())
    }

    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    pub struct LoginName(String);

    impl LoginName {
        pub fn as_str(&self) -> &str {
            &self.0
        }

        pub fn try_new(value: impl Into<String>) -> Result<Self, LoginNameError> {
            let value = value.into();
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Err(LoginNameError::Empty);
            }
            if trimmed.len() > 128 {
                return Err(LoginNameError::TooLong);
            }
            if trimmed.chars().any(|c| c.is_control() || c.is_whitespace()) {
                return Err(LoginNameError::InvalidChar);
            }
            Ok(Self(trimmed.to_string()))
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum LoginNameError {
        Empty,
        TooLong,
        InvalidChar,
    }

    impl LoginNameError {
        pub fn message(&self) -> &'static str {
            match self {
                Self::Empty => "login name must not be empty",
                Self::TooLong => "login name is too long",
                Self::InvalidChar => "login name contains whitespace or control characters",
            }
        }
    }
}

pub mod taxonomy {
    /// One column of the flat incident-type table.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub enum TaxonomyLevel {
        Category,
        Subcategory1,
        Subcategory2,
        Subcategory3,
    }

    impl TaxonomyLevel {
        /// Maps the numeric subcategory depth (1..=3) used by the form scripts.
        pub fn from_depth(depth: u8) -> Result<Self, TaxonomyLevelError> {
            match depth {
                1 => Ok(Self::Subcategory1),
                2 => Ok(Self::Subcategory2),
                3 => Ok(Self::Subcategory3),
                other => Err(TaxonomyLevelError::InvalidDepth(other)),
            }
        }

        pub fn column(self) -> &'static str {
            match self {
                Self::Category => "category",
                Self::Subcategory1 => "subcategory1",
                Self::Subcategory2 => "subcategory2",
                Self::Subcategory3 => "subcategory3",
            }
        }

        /// Column holding the immediate parent value; `None` for the top level.
        pub fn parent_column(self) -> Option<&'static str> {
            self.parent().map(Self::column)
        }

        pub fn parent(self) -> Option<Self> {
            match self {
                Self::Category => None,
                Self::Subcategory1 => Some(Self::Category),
                Self::Subcategory2 => Some(Self::Subcategory1),
                Self::Subcategory3 => Some(Self::Subcategory2),
            }
        }

        pub fn child(self) -> Option<Self> {
            match self {
                Self::Category => Some(Self::Subcategory1),
                Self::Subcategory1 => Some(Self::Subcategory2),
                Self::Subcategory2 => Some(Self::Subcategory3),
                Self::Subcategory3 => None,
            }
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum TaxonomyLevelError {
        InvalidDepth(u8),
    }

    impl TaxonomyLevelError {
        pub fn message(&self) -> &'static str {
            match self {
                Self::InvalidDepth(_) => "subcategory depth must be 1, 2 or 3",
            }
        }
    }

    /// Trims a selected dropdown value; blank selections count as "nothing selected".
    pub fn normalize_choice(value: &str) -> Option<&str> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }
}

pub mod identifier {
    use std::fmt;

    pub const FALLBACK_FACILITY_ABBREVIATION: &str = "XX";

    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    pub struct IncidentIdentifier(String);

    impl IncidentIdentifier {
        /// `abbreviation-day-month-id`, date parts unpadded.
        pub fn compose(abbreviation: Option<&str>, day: u8, month: u8, row_id: i64) -> Self {
            let abbreviation = facility_prefix(abbreviation);
            Self(format!("{abbreviation}-{day}-{month}-{row_id}"))
        }

        pub fn as_str(&self) -> &str {
            &self.0
        }

        pub fn into_string(self) -> String {
            self.0
        }
    }

    impl fmt::Display for IncidentIdentifier {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.0)
        }
    }

    pub fn facility_prefix(abbreviation: Option<&str>) -> &str {
        match abbreviation.map(str::trim) {
            Some(value) if !value.is_empty() => value,
            _ => FALLBACK_FACILITY_ABBREVIATION,
        }
    }
}

pub mod model {
    pub const DEFAULT_INCIDENT_STATUS: &str = "draft";
    pub const INCIDENT_EXPIRY_DAYS: i64 = 5;
    pub const WARD_DEPARTMENT_KIND: &str = "ward";

    /// Active flags are stored as `Y` / `N` text.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum ActiveFlag {
        Yes,
        No,
    }

    impl ActiveFlag {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Yes => "Y",
                Self::No => "N",
            }
        }

        pub fn from_bool(value: bool) -> Self {
            if value { Self::Yes } else { Self::No }
        }
    }
}
