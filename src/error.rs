use std::error::Error;
use std::fmt;

/// Failure reported by the API collaborator
///
/// Every `ProfileApi` call returns this type. The controller decides per
/// operation whether a failure is fatal (profile fetch, save) or tolerated
/// (connections, discord lookup).
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The requested profile or resource does not exist
    NotFound(String),

    /// The current user may not see the requested resource
    Forbidden,

    /// Transport or storage failure
    Io(String),

    /// The response could not be decoded
    Parse(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(what) => write!(f, "not found: {}", what),
            ApiError::Forbidden => write!(f, "access denied"),
            ApiError::Io(msg) => write!(f, "i/o failure: {}", msg),
            ApiError::Parse(msg) => write!(f, "malformed response: {}", msg),
        }
    }
}

impl Error for ApiError {}

impl From<std::io::Error> for ApiError {
    fn from(e: std::io::Error) -> Self {
        ApiError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Parse(e.to_string())
    }
}

/// Failure of a controller operation
///
/// Rejected edits leave the controller state untouched; load and save
/// failures carry the collaborator error that caused them.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileError {
    /// An edit or save was attempted before a profile was loaded
    NotLoaded,

    /// The loaded profile belongs to someone other than the signed-in user
    NotOwner,

    /// The edit path does not address a known field
    UnknownPath(String),

    /// The value sent for a path has the wrong shape
    InvalidValue { path: String, reason: String },

    /// Education entry index outside the current list
    IndexOutOfRange { index: usize, len: usize },

    /// Permission name absent from the settings
    UnknownPermission(String),

    /// Role key not part of the permission's role set
    UnknownRole { permission: String, role: String },

    /// Loading the profile failed; the page shows the access-denied view
    AccessDenied(ApiError),

    /// Saving the profile failed; state is unchanged
    SaveFailed(ApiError),

    /// A card side-effect action failed
    ActionFailed(ApiError),

    /// A card template could not be rendered
    Render(String),
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileError::NotLoaded => write!(f, "profile is not loaded"),
            ProfileError::NotOwner => write!(f, "only the profile owner can change this profile"),
            ProfileError::UnknownPath(path) => write!(f, "unknown edit path '{}'", path),
            ProfileError::InvalidValue { path, reason } => {
                write!(f, "invalid value for '{}': {}", path, reason)
            }
            ProfileError::IndexOutOfRange { index, len } => write!(
                f,
                "education entry {} does not exist (history has {} entries)",
                index, len
            ),
            ProfileError::UnknownPermission(name) => write!(f, "unknown permission '{}'", name),
            ProfileError::UnknownRole { permission, role } => {
                write!(f, "permission '{}' has no role '{}'", permission, role)
            }
            ProfileError::AccessDenied(e) => write!(f, "profile could not be loaded: {}", e),
            ProfileError::SaveFailed(e) => write!(f, "profile could not be saved: {}", e),
            ProfileError::ActionFailed(e) => write!(f, "action failed: {}", e),
            ProfileError::Render(msg) => write!(f, "render failed: {}", msg),
        }
    }
}

impl Error for ProfileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ProfileError::AccessDenied(e)
            | ProfileError::SaveFailed(e)
            | ProfileError::ActionFailed(e) => Some(e),
            _ => None,
        }
    }
}

impl From<handlebars::RenderError> for ProfileError {
    fn from(e: handlebars::RenderError) -> Self {
        ProfileError::Render(e.to_string())
    }
}

impl From<handlebars::TemplateError> for ProfileError {
    fn from(e: handlebars::TemplateError) -> Self {
        ProfileError::Render(e.to_string())
    }
}
