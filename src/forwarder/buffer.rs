/// Bounded, ordered buffer of log lines bound for the object store.
///
/// The buffer never rejects a push; callers check `is_full` after pushing
/// and flush-and-clear when capacity is reached.
pub struct LineBuffer {
    capacity: usize,
    lines: Vec<String>,
}

impl LineBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            lines: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, line: String) {
        self.lines.push(line);
    }

    pub fn is_full(&self) -> bool {
        self.lines.len() >= self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Join the buffered lines into one object body.
    pub fn join(&self) -> String {
        self.lines.join("\n")
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
