use std::path::Path;

use crate::schema::{Field, FieldKind};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];

/// A file received from a multipart form.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
    }

    fn is_image(&self) -> bool {
        let content_type_ok = self
            .content_type
            .as_deref()
            .map_or(true, |ct| ct.starts_with("image/"));
        let extension_ok = self
            .extension()
            .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()));
        content_type_ok && extension_ok
    }
}

/// Check an upload against its field's size and type limits.
/// Returns the message shown next to the field.
pub fn validate_upload(field: &Field, upload: &Upload) -> Result<(), String> {
    let FieldKind::FileUpload { max_bytes, image, .. } = &field.kind else {
        return Ok(());
    };
    let attribute = field.label().to_lowercase();
    if upload.bytes.len() > *max_bytes {
        return Err(format!(
            "The {attribute} field must not be greater than {} kilobytes.",
            max_bytes / 1024
        ));
    }
    if *image && !upload.is_image() {
        return Err(format!("The {attribute} field must be an image."));
    }
    Ok(())
}

/// Write the upload below `storage_dir/directory` under a fresh name and
/// return its path relative to `storage_dir`.
pub async fn store_upload(storage_dir: &Path, directory: &str, upload: &Upload) -> std::io::Result<String> {
    let target_dir = storage_dir.join(directory);
    tokio::fs::create_dir_all(&target_dir).await?;
    let extension = upload.extension().unwrap_or_else(|| "bin".to_string());
    let file_name = format!("{}.{}", uuid::Uuid::new_v4(), extension);
    tokio::fs::write(target_dir.join(&file_name), &upload.bytes).await?;
    tracing::info!("Stored upload {}/{} ({} bytes)", directory, file_name, upload.bytes.len());
    Ok(format!("{directory}/{file_name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn avatar_field() -> Field {
        Field::new(
            "avatar",
            FieldKind::FileUpload {
                directory: "avatars",
                max_bytes: 1024,
                image: true,
                avatar: true,
                image_editor: true,
            },
        )
    }

    fn upload(name: &str, content_type: &str, len: usize) -> Upload {
        Upload {
            file_name: name.to_string(),
            content_type: Some(content_type.to_string()),
            bytes: vec![0; len],
        }
    }

    #[test]
    fn test_limits() {
        let field = avatar_field();
        assert!(validate_upload(&field, &upload("me.PNG", "image/png", 10)).is_ok());
        assert_eq!(
            validate_upload(&field, &upload("me.png", "image/png", 2048)).unwrap_err(),
            "The avatar field must not be greater than 1 kilobytes."
        );
        assert_eq!(
            validate_upload(&field, &upload("notes.txt", "text/plain", 10)).unwrap_err(),
            "The avatar field must be an image."
        );
    }

    #[test]
    fn test_svg_is_not_an_image() {
        assert_eq!(
            validate_upload(&avatar_field(), &upload("logo.svg", "image/svg+xml", 10)).unwrap_err(),
            "The avatar field must be an image."
        );
    }

    #[tokio::test]
    async fn test_store_upload() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_upload(dir.path(), "avatars", &upload("me.jpg", "image/jpeg", 4))
            .await
            .unwrap();
        assert!(path.starts_with("avatars/"));
        assert!(path.ends_with(".jpg"));
        assert_eq!(std::fs::read(dir.path().join(&path)).unwrap().len(), 4);
    }
}
