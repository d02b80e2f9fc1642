//! Request/response DTOs for the cubby API.

mod request;
mod response;
mod validation;

pub use request::{GetFileQuery, ListFilesQuery, SignInRequest, SignUpRequest};
pub use response::{
    AccessTokenResponse, FileMetadataResponse, FileUploadResponse, UserInfoResponse,
};
pub use validation::ValidatedJson;
