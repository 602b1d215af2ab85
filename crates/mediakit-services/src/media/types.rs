/// A raw upload as handed over by the transport layer.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub data: Vec<u8>,
    /// Name supplied by the client. Recorded as metadata only.
    pub original_name: String,
    /// Declared content type. The media type is derived from this.
    pub content_type: String,
}

impl UploadFile {
    pub fn new(
        data: Vec<u8>,
        original_name: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            data,
            original_name: original_name.into(),
            content_type: content_type.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}
