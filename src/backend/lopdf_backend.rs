//! lopdf-based document backend.
//!
//! Implements [`FormDocument`] using the [lopdf](https://crates.io/crates/lopdf)
//! crate. Field attributes (`FT`, `Ff`, `T`, `Opt`) are inheritable per
//! ISO 32000-1:2008 §12.7.3.1, so a widget that is the kid of a radio group
//! reads its name and flags from the parent field.

use super::{FormDocument, RawFieldKind, RawOption, RawWidget, TextRun};
use crate::content::{collect_text_runs, decode_text_string, number};
use crate::error::{Error, Result};
use crate::fonts::{FontDecoder, PageFonts, ToUnicodeMap};
use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// Guard against cyclic `/Parent` chains.
const MAX_FIELD_DEPTH: usize = 32;

/// A parsed PDF document backed by lopdf.
pub struct LopdfDocument {
    inner: Document,
    /// Page object ids indexed by zero-based page number.
    page_ids: Vec<ObjectId>,
}

impl std::fmt::Debug for LopdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LopdfDocument")
            .field("page_count", &self.page_ids.len())
            .finish_non_exhaustive()
    }
}

impl LopdfDocument {
    /// Parse a document from an in-memory buffer.
    pub fn load_mem(bytes: &[u8]) -> Result<Self> {
        let inner = Document::load_mem(bytes)?;
        Ok(Self::from_document(inner))
    }

    /// Wrap an already loaded lopdf document.
    pub fn from_document(inner: Document) -> Self {
        // get_pages is keyed by 1-based page number
        let page_ids = inner.get_pages().values().copied().collect();
        Self { inner, page_ids }
    }

    /// Access the underlying lopdf document.
    pub fn inner(&self) -> &Document {
        &self.inner
    }

    fn page_dict(&self, page: usize) -> Result<(ObjectId, &Dictionary)> {
        let id = *self.page_ids.get(page).ok_or_else(|| Error::Page {
            page,
            reason: format!("page index out of range (0..{})", self.page_ids.len()),
        })?;
        let dict = self
            .inner
            .get_object(id)
            .and_then(|o| o.as_dict())
            .map_err(|e| Error::Page {
                page,
                reason: format!("failed to get page dictionary: {e}"),
            })?;
        Ok((id, dict))
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> Option<&'a Object> {
        match obj {
            Object::Reference(id) => self.inner.get_object(*id).ok(),
            other => Some(other),
        }
    }

    /// Look up a field attribute on the widget or any ancestor field.
    fn inherited<'a>(&'a self, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
        let mut current = dict;
        for _ in 0..MAX_FIELD_DEPTH {
            if let Ok(value) = current.get(key) {
                return self.resolve(value);
            }
            let parent = current.get(b"Parent").ok()?;
            current = self.resolve(parent)?.as_dict().ok()?;
        }
        log::warn!("Field /Parent chain deeper than {}, giving up", MAX_FIELD_DEPTH);
        None
    }

    /// Fully qualified field name: the partial `/T` of the widget and each
    /// ancestor field, joined with `.` (ISO 32000-1:2008 §12.7.3.2).
    fn qualified_name(&self, dict: &Dictionary) -> Option<String> {
        let mut parts = Vec::new();
        let mut current = dict;
        for _ in 0..MAX_FIELD_DEPTH {
            let partial = current
                .get(b"T")
                .ok()
                .and_then(|o| self.resolve(o))
                .and_then(text_value)
                .filter(|t| !t.trim().is_empty());
            if let Some(partial) = partial {
                parts.push(partial);
            }
            match current
                .get(b"Parent")
                .ok()
                .and_then(|o| self.resolve(o))
                .and_then(|o| o.as_dict().ok())
            {
                Some(parent) => current = parent,
                None => break,
            }
        }
        if parts.is_empty() {
            return None;
        }
        parts.reverse();
        Some(parts.join("."))
    }

    fn parse_widget(&self, dict: &Dictionary) -> RawWidget {
        let kind = self
            .inherited(dict, b"FT")
            .and_then(|o| o.as_name().ok())
            .map(|n| RawFieldKind::from_pdf_name(&String::from_utf8_lossy(n)));

        let flags = self
            .inherited(dict, b"Ff")
            .and_then(|o| o.as_i64().ok())
            .map(|n| n as u32)
            .unwrap_or(0);

        let name = self.qualified_name(dict);

        let rect = dict
            .get(b"Rect")
            .ok()
            .and_then(|o| self.resolve(o))
            .and_then(|o| o.as_array().ok())
            .and_then(|arr| rect_from_array(arr));

        let options = self
            .inherited(dict, b"Opt")
            .and_then(|o| o.as_array().ok())
            .map(|arr| arr.iter().filter_map(|o| self.parse_option(o)).collect())
            .unwrap_or_default();

        RawWidget {
            kind,
            rect,
            name,
            flags,
            export_value: self.export_value(dict),
            options,
            ..RawWidget::default()
        }
    }

    fn parse_option(&self, obj: &Object) -> Option<RawOption> {
        match self.resolve(obj)? {
            Object::Array(pair) if pair.len() >= 2 => {
                let value = self.resolve(&pair[0]).and_then(text_value)?;
                let label = self.resolve(&pair[1]).and_then(text_value)?;
                Some(RawOption::Pair(value, label))
            },
            other => text_value(other).map(RawOption::Scalar),
        }
    }

    /// Decoders for the page's font resources (`/Resources` is inheritable).
    fn page_fonts(&self, page_dict: &Dictionary) -> PageFonts {
        let mut fonts = PageFonts::new();
        let font_dict = self
            .inherited(page_dict, b"Resources")
            .and_then(|o| o.as_dict().ok())
            .and_then(|res| res.get(b"Font").ok())
            .and_then(|o| self.resolve(o))
            .and_then(|o| o.as_dict().ok());
        let font_dict = match font_dict {
            Some(dict) => dict,
            None => return fonts,
        };

        for (name, obj) in font_dict.iter() {
            let font = match self.resolve(obj).and_then(|o| o.as_dict().ok()) {
                Some(font) => font,
                None => continue,
            };
            let subtype = font.get(b"Subtype").and_then(|o| o.as_name()).unwrap_or(&b"Type1"[..]);
            let to_unicode = font
                .get(b"ToUnicode")
                .ok()
                .and_then(|o| self.resolve(o))
                .and_then(|o| o.as_stream().ok())
                .and_then(stream_data)
                .map(|data| ToUnicodeMap::parse(&data))
                .filter(|cmap| !cmap.is_empty());
            log::trace!(
                "Font /{}: {} with{} ToUnicode",
                String::from_utf8_lossy(name),
                String::from_utf8_lossy(subtype),
                if to_unicode.is_some() { "" } else { "out" }
            );
            fonts.insert(name.clone(), FontDecoder::from_subtype(subtype, to_unicode));
        }
        fonts
    }

    /// On-state name of a button: the non-`Off` key of its normal appearance.
    fn export_value(&self, dict: &Dictionary) -> Option<String> {
        let normal = dict
            .get(b"AP")
            .ok()
            .and_then(|o| self.resolve(o))
            .and_then(|o| o.as_dict().ok())
            .and_then(|ap| ap.get(b"N").ok())
            .and_then(|o| self.resolve(o))
            .and_then(|o| o.as_dict().ok());

        if let Some(states) = normal {
            let on_state = states
                .iter()
                .map(|(key, _)| String::from_utf8_lossy(key).into_owned())
                .find(|key| key != "Off");
            if on_state.is_some() {
                return on_state;
            }
        }

        dict.get(b"AS")
            .ok()
            .and_then(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).into_owned())
            .filter(|s| s != "Off")
    }
}

impl FormDocument for LopdfDocument {
    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn widget_annotations(&self, page: usize) -> Result<Vec<RawWidget>> {
        let (_, page_dict) = self.page_dict(page)?;

        let annots = match page_dict.get(b"Annots").ok().and_then(|o| self.resolve(o)) {
            Some(Object::Array(arr)) => arr,
            _ => return Ok(Vec::new()),
        };

        let mut widgets = Vec::new();
        for annot in annots {
            let dict = match self.resolve(annot).and_then(|o| o.as_dict().ok()) {
                Some(dict) => dict,
                None => {
                    log::debug!("Page {}: skipping annotation that is not a dictionary", page);
                    continue;
                },
            };

            let is_widget = dict
                .get(b"Subtype")
                .ok()
                .and_then(|o| o.as_name().ok())
                .is_some_and(|n| n == b"Widget");
            if is_widget {
                widgets.push(self.parse_widget(dict));
            }
        }

        Ok(widgets)
    }

    fn text_content(&self, page: usize) -> Result<Vec<TextRun>> {
        let (id, page_dict) = self.page_dict(page)?;
        let fonts = self.page_fonts(page_dict);
        let data = self.inner.get_page_content(id).map_err(|e| Error::Page {
            page,
            reason: format!("failed to read content stream: {e}"),
        })?;
        let content = Content::decode(&data).map_err(|e| Error::Page {
            page,
            reason: format!("failed to decode content stream: {e}"),
        })?;
        Ok(collect_text_runs(&content.operations, &fonts))
    }
}

fn rect_from_array(arr: &[Object]) -> Option<[f32; 4]> {
    if arr.len() != 4 {
        return None;
    }
    let mut rect = [0.0; 4];
    for (slot, obj) in rect.iter_mut().zip(arr) {
        *slot = number(obj)?;
    }
    Some(rect)
}

fn stream_data(stream: &Stream) -> Option<Vec<u8>> {
    if stream.dict.has(b"Filter") {
        stream.decompressed_content().ok()
    } else {
        Some(stream.content.clone())
    }
}

fn text_value(obj: &Object) -> Option<String> {
    match obj {
        Object::String(bytes, _) => Some(decode_text_string(bytes)),
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}
