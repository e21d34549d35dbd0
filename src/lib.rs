/*!
# Profile Page

A browser-based profile page: display/edit cards composed into one page,
backed by calls to a separate profile API service.

## Architecture

### Profile controller
- Owns the canonical profile record and two snapshots taken at the last
  load or save (one of the permission settings, one of the whole record)
- Tracks two independent dirty flags, recomputed by value equality after
  every edit: `permissions_changed` and `profile_settings_changed`
- Loads the profile, extended data and notification connections
  concurrently, annotates student stats with course completion
- Saves on demand and finishes the discord account link round trip
- Accepts edits, saves and the discord link only on the signed-in user's
  own profile

### Cards
- Main, about, education, english, contacts, discord, public feedback,
  student stats, mentor stats, CoreJS interviews and pre-screening
  interviews
- Pure functions of the record slice they show plus the edit-mode flag,
  rendered with handlebars templates
- Re-rendered only when their slice changed

### Edits
Cards send `{path, value}` pairs (`generalInfo.location`,
`contacts.telegram`, ...). The dotted path is parsed once into a typed
[`GeneralEdit`] and applied by a pure reducer; permission checkboxes send
a [`PermissionEdit`] plus the checked state.

## Modules

- **profile**: Record types, permission table
- **edit**: Typed edits and wire parsing
- **reducer**: Pure edit transitions with dirty recomputation
- **controller**: Load / edit / save / discord state machine
- **api**: Collaborator trait for the API service
- **store**: JSON file implementation of the collaborator
- **cards**, **render**: Card views and page composition
- **local**: Locally cached active course id
- **config**: Server settings
- **app**: axum routes (feature `web`)
*/

pub mod api;
pub mod cards;
pub mod config;
pub mod controller;
pub mod edit;
pub mod error;
pub mod local;
pub mod profile;
pub mod reducer;
pub mod render;
pub mod store;

#[cfg(feature = "web")]
pub mod app;

pub use api::{ProfileApi, SaveProfileRequest};
pub use controller::{DirtyState, Notice, PageView, ProfileController};
pub use edit::{
    ContactField, EditRequest, EducationEdit, EducationField, FieldEdit, GeneralEdit,
    LocationPatch, PermissionEdit, PermissionEditRequest,
};
pub use error::{ApiError, ProfileError};
pub use profile::*;
