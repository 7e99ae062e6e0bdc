//! Client side of the document upload wizard: validates the source document and
//! terminology table against the server, mirrors the results into a page, and
//! hands the validated paths on for editing or processing.

pub mod api;
pub mod controller;
pub mod error;
pub mod page;
pub mod state;
pub mod transport;

pub use api::WizardApi;
pub use controller::WizardController;
pub use error::{WizardError, WizardResult};
pub use page::{BoundElements, MemoryPage, StatusIndicator, UploadFile, WizardPage};
pub use state::{RolePhase, ValidatedFiles, WizardState};
pub use transport::HttpWizardApi;
