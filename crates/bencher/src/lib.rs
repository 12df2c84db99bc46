/// One benchmark input: a message file and how it is fed to the parser.
#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    kind: MessageKind,
    file: TestFile,
    fragment_size: Option<usize>,
}

impl TestCase {
    pub fn new(name: &'static str, kind: MessageKind, file: TestFile) -> Self {
        Self { name, kind, file, fragment_size: None }
    }

    pub fn request(name: &'static str, file: TestFile) -> Self {
        Self::new(name, MessageKind::Request, file)
    }

    pub fn response(name: &'static str, file: TestFile) -> Self {
        Self::new(name, MessageKind::Response, file)
    }

    /// Feeds the message in slices of `size` bytes instead of one buffer.
    pub fn fragmented(mut self, size: usize) -> Self {
        self.fragment_size = Some(size);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn file(&self) -> &TestFile {
        &self.file
    }

    pub fn file_name(&self) -> &'static str {
        self.file().file_name
    }

    /// The slice size used to feed the message, the whole message when not fragmented.
    pub fn fragment_size(&self) -> usize {
        self.fragment_size.unwrap_or(self.file.content.len()).max(1)
    }
}

#[derive(Debug, Copy, Clone)]
pub struct TestFile {
    file_name: &'static str,
    content: &'static str,
}

impl TestFile {
    pub const fn new(file_name: &'static str, content: &'static str) -> Self {
        Self { file_name, content }
    }

    pub fn content(&self) -> &'static str {
        self.content
    }

    pub fn file_name(&self) -> &'static str {
        self.file_name
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Request,
    Response,
}
