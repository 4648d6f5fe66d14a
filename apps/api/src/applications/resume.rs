//! Accepted resume formats and their storage keys.

use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeFormat {
    Pdf,
    Doc,
    Docx,
}

impl ResumeFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ResumeFormat::Pdf => "application/pdf",
            ResumeFormat::Doc => "application/msword",
            ResumeFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ResumeFormat::Pdf => "pdf",
            ResumeFormat::Doc => "doc",
            ResumeFormat::Docx => "docx",
        }
    }

    fn from_content_type(content_type: &str) -> Option<Self> {
        [ResumeFormat::Pdf, ResumeFormat::Doc, ResumeFormat::Docx]
            .into_iter()
            .find(|f| f.content_type().eq_ignore_ascii_case(content_type.trim()))
    }

    fn from_file_name(file_name: &str) -> Option<Self> {
        let (_, ext) = file_name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(ResumeFormat::Pdf),
            "doc" => Some(ResumeFormat::Doc),
            "docx" => Some(ResumeFormat::Docx),
            _ => None,
        }
    }

    /// A recognised content type wins; otherwise the file extension decides.
    pub fn detect(file_name: Option<&str>, content_type: Option<&str>) -> Option<Self> {
        content_type
            .and_then(Self::from_content_type)
            .or_else(|| file_name.and_then(Self::from_file_name))
    }
}

pub fn resume_key(application_id: Uuid, format: ResumeFormat) -> String {
    format!(
        "resumes/{application_id}/{}.{}",
        Uuid::new_v4(),
        format.extension()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_from_content_type_first() {
        assert_eq!(
            ResumeFormat::detect(Some("cv.bin"), Some("application/pdf")),
            Some(ResumeFormat::Pdf)
        );
    }

    #[test]
    fn falls_back_to_extension() {
        assert_eq!(
            ResumeFormat::detect(Some("Jane_CV.DOCX"), Some("application/octet-stream")),
            Some(ResumeFormat::Docx)
        );
        assert_eq!(
            ResumeFormat::detect(Some("resume.doc"), None),
            Some(ResumeFormat::Doc)
        );
    }

    #[test]
    fn rejects_other_files() {
        assert_eq!(ResumeFormat::detect(Some("photo.png"), Some("image/png")), None);
        assert_eq!(ResumeFormat::detect(Some("README"), None), None);
        assert_eq!(ResumeFormat::detect(None, None), None);
    }

    #[test]
    fn keys_are_scoped_to_the_application() {
        let id = Uuid::new_v4();
        let key = resume_key(id, ResumeFormat::Pdf);
        assert!(key.starts_with(&format!("resumes/{id}/")));
        assert!(key.ends_with(".pdf"));
    }
}
