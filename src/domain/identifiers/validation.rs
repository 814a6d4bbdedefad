/// Validates a single slot key segment.
///
/// Checks:
/// - Non-empty
/// - Characters are ASCII alphanumeric, '-' or '_'
pub fn validate_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Validates a `/`-separated slot path (key or group).
///
/// Every segment must pass [`validate_segment`], which also rules out
/// leading, trailing, or doubled separators.
pub fn validate_slot_path(path: &str) -> bool {
    !path.is_empty() && path.split('/').all(validate_segment)
}

/// Normalize a storage-derived key the way wildcard files are addressed:
/// backslashes become `/`, spaces become `-`, and letters are lowercased.
pub fn normalize_key(raw: &str) -> String {
    raw.replace('\\', "/").replace(' ', "-").to_lowercase()
}

#[macro_export]
macro_rules! impl_validated_path {
    ($name:ident, $err_variant:path) => {
        impl $name {
            /// Validate and create a new instance.
            pub fn new(id: &str) -> Result<Self, $crate::domain::AppError> {
                if $crate::domain::identifiers::validation::validate_slot_path(id) {
                    Ok(Self(id.to_string()))
                } else {
                    Err($err_variant(id.to_string()))
                }
            }

            /// Return the inner string value.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;
            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}
