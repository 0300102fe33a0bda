//! Remote cart and wishlist service clients.
//!
//! Each service is a trait with an in-memory implementation for tests
//! and an HTTP implementation speaking to the storefront REST API.

pub mod cart;
pub mod config;
pub mod wishlist;

pub use cart::{
    AddItemRequest, HttpCartService, InMemoryCartService, RemoteCartAdd, RemoteCartLine,
    RemoteCartService,
};
pub use config::ApiConfig;
pub use wishlist::{
    HttpWishlistService, InMemoryWishlistService, RemoteWishlistLine, WishlistService,
};

/// Placeholder shown when a product has no usable image reference.
pub const PLACEHOLDER_IMAGE: &str = "/assets/images/no_image.png";

/// Resolves an image reference from the wire against the API origin.
///
/// Absolute and data URLs pass through; relative paths are joined to
/// the base URL so cart images match product images; empty references
/// fall back to the placeholder.
pub fn resolve_image_url(base_url: &str, candidate: Option<&str>) -> String {
    let src = candidate.unwrap_or("");
    if src.is_empty() {
        return PLACEHOLDER_IMAGE.to_string();
    }
    if src.starts_with("http://") || src.starts_with("https://") || src.starts_with("data:") {
        return src.to_string();
    }
    if src.starts_with('/') {
        format!("{base_url}{src}")
    } else {
        format!("{base_url}/{src}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_reference_uses_placeholder() {
        assert_eq!(
            resolve_image_url("http://localhost:8080", None),
            PLACEHOLDER_IMAGE
        );
        assert_eq!(
            resolve_image_url("http://localhost:8080", Some("")),
            PLACEHOLDER_IMAGE
        );
    }

    #[test]
    fn test_absolute_urls_pass_through() {
        assert_eq!(
            resolve_image_url("http://localhost:8080", Some("https://cdn.example.com/a.jpg")),
            "https://cdn.example.com/a.jpg"
        );
        assert_eq!(
            resolve_image_url("http://localhost:8080", Some("data:image/png;base64,xyz")),
            "data:image/png;base64,xyz"
        );
    }

    #[test]
    fn test_relative_paths_join_base_url() {
        assert_eq!(
            resolve_image_url("http://localhost:8080", Some("/uploads/a.jpg")),
            "http://localhost:8080/uploads/a.jpg"
        );
        assert_eq!(
            resolve_image_url("http://localhost:8080", Some("uploads/a.jpg")),
            "http://localhost:8080/uploads/a.jpg"
        );
    }
}
