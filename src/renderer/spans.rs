//! Span chains produced by the (external) edge walker.
//!
//! One chain per polygon per frame. Spans live in an arena and are linked by
//! index; the fillers only ever follow `next` until [`NO_SPAN`].

pub type SpanId = u32;

/// Chain terminator.
pub const NO_SPAN: SpanId = u32::MAX;

/// One horizontal run of `count` pixels starting at `(x_start, y)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub x_start: u16,
    pub y: u16,
    pub count: u16,
    pub next: SpanId,
}

/// Arena holding the spans of one polygon, linked front to back.
#[derive(Clone, Debug)]
pub struct SpanChain {
    spans: Vec<Span>,
    head: SpanId,
    tail: SpanId,
}

impl Default for SpanChain {
    fn default() -> Self {
        Self::new()
    }
}

impl SpanChain {
    pub fn new() -> Self {
        Self {
            spans: Vec::new(),
            head: NO_SPAN,
            tail: NO_SPAN,
        }
    }

    /// Build a chain from `(x_start, y, count)` triples, in order.
    pub fn from_runs<I>(runs: I) -> Self
    where
        I: IntoIterator<Item = (u16, u16, u16)>,
    {
        let mut chain = Self::new();
        for (x, y, count) in runs {
            chain.push(x, y, count);
        }
        chain
    }

    pub fn clear(&mut self) {
        self.spans.clear();
        self.head = NO_SPAN;
        self.tail = NO_SPAN;
    }

    /// Append a span at the end of the chain and return its id.
    pub fn push(&mut self, x_start: u16, y: u16, count: u16) -> SpanId {
        assert!(self.spans.len() < NO_SPAN as usize);

        let id = self.spans.len() as SpanId;
        self.spans.push(Span {
            x_start,
            y,
            count,
            next: NO_SPAN,
        });

        if self.tail == NO_SPAN {
            self.head = id;
        } else {
            self.spans[self.tail as usize].next = id;
        }
        self.tail = id;
        id
    }

    #[inline]
    pub fn head(&self) -> SpanId {
        self.head
    }

    pub fn get(&self, id: SpanId) -> Option<&Span> {
        if id == NO_SPAN {
            None
        } else {
            self.spans.get(id as usize)
        }
    }

    /// Number of spans stored in the arena.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Total number of pixels covered by the chain.
    pub fn pixel_count(&self) -> usize {
        self.iter().map(|s| s.count as usize).sum()
    }

    /// Walk the chain by following `next` links from the head.
    #[inline]
    pub fn iter(&self) -> ChainIter<'_> {
        ChainIter {
            chain: self,
            cur: self.head,
        }
    }
}

impl<'a> IntoIterator for &'a SpanChain {
    type Item = &'a Span;
    type IntoIter = ChainIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct ChainIter<'a> {
    chain: &'a SpanChain,
    cur: SpanId,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = &'a Span;

    #[inline]
    fn next(&mut self) -> Option<&'a Span> {
        let span = self.chain.get(self.cur)?;
        self.cur = span.next;
        Some(span)
    }
}
