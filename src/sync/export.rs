//! Export Helpers
//!
//! Destination defaults for the external export services: the tagging
//! bookmark service picks a collection from the item's domain, and the
//! cloud-storage drop folder derives a file path from title and URL.

use crate::api::RaindropCollection;

/// Folder all drop-folder exports land in.
const DROP_FOLDER: &str = "/applemint";

/// Default destination collection for a tagging-service export: the first
/// label of the item's domain matched against the collection titles,
/// falling back to `"etc"`.
pub fn default_export_collection(domain: &str, collections: &[RaindropCollection]) -> String {
    let label = domain.split('.').next().unwrap_or(domain);
    collections
        .iter()
        .find(|c| c.title == label)
        .map(|c| c.title.clone())
        .unwrap_or_else(|| "etc".to_string())
}

/// Drop-folder path for a gallery item: untitled items keep the URL's file
/// name, titled items get the title plus the URL's extension.
pub fn drop_folder_path(title: &str, url: &str) -> String {
    let file_name = if title.is_empty() {
        url.rsplit('/').next().unwrap_or(url).to_string()
    } else {
        let extension = url.rfind('.').map(|at| &url[at..]).unwrap_or("");
        format!("{}{}", title, extension)
    };
    format!("{}/{}", DROP_FOLDER, file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collections() -> Vec<RaindropCollection> {
        vec![
            RaindropCollection {
                id: "10".to_string(),
                title: "github".to_string(),
            },
            RaindropCollection {
                id: "11".to_string(),
                title: "etc".to_string(),
            },
        ]
    }

    #[test]
    fn test_default_collection_matches_domain_label() {
        assert_eq!(default_export_collection("github.com", &collections()), "github");
    }

    #[test]
    fn test_default_collection_falls_back_to_etc() {
        assert_eq!(default_export_collection("example.com", &collections()), "etc");
    }

    #[test]
    fn test_drop_folder_path_untitled_uses_url_file_name() {
        assert_eq!(
            drop_folder_path("", "https://cdn.example.com/media/cat.mp4"),
            "/applemint/cat.mp4"
        );
    }

    #[test]
    fn test_drop_folder_path_titled_keeps_url_extension() {
        assert_eq!(
            drop_folder_path("tabby", "https://cdn.example.com/media/cat.jpg"),
            "/applemint/tabby.jpg"
        );
    }
}
