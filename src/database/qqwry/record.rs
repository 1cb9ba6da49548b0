//! Record layouts and their resolution to country/area bytes

use crate::error::Result;

use super::reader::{ByteView, DIRECT_MODE, REDIRECT_MODE_1, REDIRECT_MODE_2};

/// Shape of a record body, selected by the byte following `end_ip`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordLayout {
    /// Country stored inline at `at`, area right after its terminator
    Direct { at: u32 },
    /// Mode 2: country behind one pointer, area inline after the
    /// 8-byte redirect record
    RedirectOnce { country: u32, area: u32 },
    /// Mode 1: pointer to a shared country/area block whose country may
    /// itself be redirected once more
    RedirectTwice { target: u32 },
}

impl RecordLayout {
    /// Classify the record starting at `record_offset` (its `end_ip` field)
    pub fn read(view: ByteView<'_>, record_offset: u32) -> Result<Self> {
        let body = record_offset.saturating_add(4);
        let layout = match view.read_u8(body)? {
            REDIRECT_MODE_1 => RecordLayout::RedirectTwice {
                target: view.read_u24(body.saturating_add(1))?,
            },
            REDIRECT_MODE_2 => RecordLayout::RedirectOnce {
                country: view.read_u24(body.saturating_add(1))?,
                area: record_offset.saturating_add(8),
            },
            DIRECT_MODE => RecordLayout::Direct {
                at: body.saturating_add(1),
            },
            // untagged: the byte is already the first byte of the country
            _ => RecordLayout::Direct { at: body },
        };
        Ok(layout)
    }

    /// Follow the layout to the raw country and area strings.
    ///
    /// At most two pointers are followed for the country and one for the
    /// area; a mode byte found where a string is expected is read as text.
    pub fn resolve<'a>(self, view: ByteView<'a>) -> Result<(&'a [u8], Option<&'a [u8]>)> {
        match self {
            RecordLayout::Direct { at } => {
                let (country, next) = view.read_cstr(at)?;
                Ok((country, read_area(view, next)?))
            }
            RecordLayout::RedirectOnce { country, area } => {
                let (country, _) = view.read_cstr(country)?;
                Ok((country, read_area(view, area)?))
            }
            RecordLayout::RedirectTwice { target } => {
                if view.read_u8(target)? == REDIRECT_MODE_2 {
                    let country_at = view.read_u24(target.saturating_add(1))?;
                    let (country, _) = view.read_cstr(country_at)?;
                    Ok((country, read_area(view, target.saturating_add(4))?))
                } else {
                    let (country, next) = view.read_cstr(target)?;
                    Ok((country, read_area(view, next)?))
                }
            }
        }
    }
}

/// Read the area field at `at`, following its optional one-level redirect.
///
/// A redirect pointer of zero means there is no area.
fn read_area<'a>(view: ByteView<'a>, at: u32) -> Result<Option<&'a [u8]>> {
    match view.read_u8(at)? {
        REDIRECT_MODE_1 | REDIRECT_MODE_2 => {
            let pointer = view.read_u24(at.saturating_add(1))?;
            if pointer == 0 {
                return Ok(None);
            }
            Ok(Some(view.read_cstr(pointer)?.0))
        }
        _ => Ok(Some(view.read_cstr(at)?.0)),
    }
}
