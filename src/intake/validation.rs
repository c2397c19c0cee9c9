use crate::{
    error::ValidationError,
    models::{SelectedFile, UploadItem},
    settings::Settings,
};

/// Checks one newly selected file, in this order: duplicate of an already
/// queued (or just accepted) file, size limit, extension.
pub fn validate_file(
    file: &SelectedFile,
    existing: &[UploadItem],
    accepted: &[UploadItem],
    settings: &Settings,
) -> Result<(), ValidationError> {
    let is_duplicate = existing
        .iter()
        .chain(accepted.iter())
        .any(|item| item.file.same_upload_as(file));
    if is_duplicate {
        return Err(ValidationError::Duplicate(file.name.clone()));
    }

    if file.size_bytes > settings.max_file_size_bytes {
        return Err(ValidationError::TooLarge {
            name: file.name.clone(),
            limit_mb: settings.max_file_size_mb(),
        });
    }

    let supported = file
        .extension()
        .map(|ext| settings.is_supported(&ext))
        .unwrap_or(false);
    if !supported {
        return Err(ValidationError::UnsupportedFormat {
            name: file.name.clone(),
            allowed: settings.supported_list(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileSource;
    use std::sync::Arc;

    fn sized(name: &str, size_bytes: u64) -> SelectedFile {
        SelectedFile {
            name: name.into(),
            size_bytes,
            source: FileSource::Memory(Arc::from(&b""[..])),
        }
    }

    #[test]
    fn accepts_supported_radiographs() {
        let settings = Settings::default();
        assert!(validate_file(&sized("bitewing.dcm", 1024), &[], &[], &settings).is_ok());
        assert!(validate_file(&sized("PANO.RVG", 1024), &[], &[], &settings).is_ok());
    }

    #[test]
    fn duplicate_is_checked_before_size_and_extension() {
        let settings = Settings::default();
        let existing = vec![UploadItem::new(sized("huge.txt", 60 * 1024 * 1024))];

        let err = validate_file(&sized("huge.txt", 60 * 1024 * 1024), &existing, &[], &settings)
            .unwrap_err();
        assert_eq!(err, ValidationError::Duplicate("huge.txt".into()));
    }

    #[test]
    fn same_name_different_size_is_not_a_duplicate() {
        let settings = Settings::default();
        let existing = vec![UploadItem::new(sized("a.dcm", 10))];
        assert!(validate_file(&sized("a.dcm", 11), &existing, &[], &settings).is_ok());
    }

    #[test]
    fn duplicates_within_one_selection_are_caught() {
        let settings = Settings::default();
        let accepted = vec![UploadItem::new(sized("a.dcm", 10))];
        assert!(matches!(
            validate_file(&sized("a.dcm", 10), &[], &accepted, &settings),
            Err(ValidationError::Duplicate(_))
        ));
    }

    #[test]
    fn size_limit_is_inclusive() {
        let settings = Settings::default();
        let limit = settings.max_file_size_bytes;
        assert!(validate_file(&sized("edge.dcm", limit), &[], &[], &settings).is_ok());
        assert_eq!(
            validate_file(&sized("over.dcm", limit + 1), &[], &[], &settings).unwrap_err(),
            ValidationError::TooLarge {
                name: "over.dcm".into(),
                limit_mb: 50
            }
        );
    }

    #[test]
    fn size_is_checked_before_extension() {
        let settings = Settings::default();
        let err = validate_file(&sized("photo.png", u64::MAX), &[], &[], &settings).unwrap_err();
        assert!(matches!(err, ValidationError::TooLarge { .. }));
    }

    #[test]
    fn rejects_unsupported_or_missing_extension() {
        let settings = Settings::default();
        for name in ["photo.jpg", "notes", "scan.dcm.zip"] {
            let err = validate_file(&sized(name, 10), &[], &[], &settings).unwrap_err();
            assert!(
                matches!(err, ValidationError::UnsupportedFormat { .. }),
                "{name} should be rejected"
            );
        }
    }
}
