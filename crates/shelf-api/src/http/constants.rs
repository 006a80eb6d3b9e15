//! Shared HTTP constants (headers, problem URIs, form field names).

pub(crate) const HEADER_USER_ID: &str = "x-shelf-user-id";
pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";

/// Path prefix shared by every bulk action endpoint.
pub(crate) const BULK_PATH_PREFIX: &str = "/api/assets/";

pub(crate) const PROBLEM_INTERNAL: &str = "https://shelf.dev/problems/internal";
pub(crate) const PROBLEM_UNAUTHORIZED: &str = "https://shelf.dev/problems/unauthorized";
pub(crate) const PROBLEM_FORBIDDEN: &str = "https://shelf.dev/problems/forbidden";
pub(crate) const PROBLEM_BAD_REQUEST: &str = "https://shelf.dev/problems/bad-request";
pub(crate) const PROBLEM_NOT_FOUND: &str = "https://shelf.dev/problems/not-found";

pub(crate) const MAIN_IMAGE_FIELD: &str = "mainImage";
pub(crate) const UPLOAD_FAILED_MESSAGE: &str = "Couldn't upload image";
pub(crate) const NO_MATCH_MESSAGE: &str = "None of the selected assets could be updated";
pub(crate) const BULK_FAILED_MESSAGE: &str = "Something went wrong while updating the assets";

/// Headroom over the image limit for multipart framing.
pub(crate) const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;
