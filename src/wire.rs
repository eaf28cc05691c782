use std::collections::HashMap;

use anyhow::{Error, Result, anyhow, bail};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, QName, ResolveResult};
use quick_xml::reader::NsReader;

use crate::models::{notification::NotificationItem, status::Acknowledgement};

/// Namespace of the gateway's notification schema. The inbound payload is
/// located by this namespace, not by the shape of the transport envelope
/// around it.
pub const NOTIFICATION_NS: &str = "http://notification.services.gateway.com";

const ITEM_TAG: &[u8] = b"NotificationRequestItem";

/// Parses a raw enveloped batch into its notification items, in wire order.
///
/// Either the whole batch parses or none of it does; no partial results are
/// handed out on failure. An envelope carrying zero items is a valid, empty
/// batch.
pub fn parse_notification_batch(raw: &str) -> Result<Vec<NotificationItem>, Error> {
    if raw.trim().is_empty() {
        bail!("notification payload is empty");
    }

    let mut reader = NsReader::from_str(raw);
    let config = reader.config_mut();
    config.trim_text_start = true;
    config.trim_text_end = true;

    // The transport envelope is not ours to validate. Scan for the first
    // element bound to the notification namespace and parse from there.
    loop {
        match read(&mut reader)? {
            Event::Start(e) => {
                if in_notification_ns(&reader, e.name()) {
                    if e.local_name().as_ref() == ITEM_TAG {
                        return Ok(vec![parse_item(&mut reader)?]);
                    }
                    return parse_payload(&mut reader);
                }
            }
            Event::Empty(e) if in_notification_ns(&reader, e.name()) => {
                if e.local_name().as_ref() == ITEM_TAG {
                    bail!("notification item is missing eventCode");
                }
                // A self-closed payload element is a batch with zero items.
                return Ok(Vec::new());
            }
            Event::Eof => {
                bail!("no element in namespace {} found", NOTIFICATION_NS)
            }
            _ => {}
        }
    }
}

/// Builds the acknowledgment envelope carrying a single response field with
/// the token as its value. Both tokens are XML-inert, so the fixed envelope
/// is assembled directly.
pub fn encode_notification_response(acknowledgement: Acknowledgement) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
<soap:Body>
<ns1:sendNotificationResponse xmlns:ns1="{NOTIFICATION_NS}">
<ns1:notificationResponse>{}</ns1:notificationResponse>
</ns1:sendNotificationResponse>
</soap:Body>
</soap:Envelope>"#,
        acknowledgement.as_str()
    )
}

fn read<'i>(reader: &mut NsReader<&'i [u8]>) -> Result<Event<'i>, Error> {
    reader
        .read_event()
        .map_err(|e| anyhow!("malformed notification XML: {}", e))
}

fn in_notification_ns(reader: &NsReader<&[u8]>, name: QName) -> bool {
    matches!(
        reader.resolve_element(name).0,
        ResolveResult::Bound(Namespace(ns)) if ns == NOTIFICATION_NS.as_bytes()
    )
}

/// Consumes the subtree of the already-opened payload element, collecting
/// every notification item it contains. Wrapper elements between the
/// payload root and the items are walked through without interpretation.
fn parse_payload(reader: &mut NsReader<&[u8]>) -> Result<Vec<NotificationItem>, Error> {
    let mut items = Vec::new();
    let mut depth = 1usize;

    loop {
        match read(reader)? {
            Event::Start(e) => {
                if in_notification_ns(reader, e.name()) && e.local_name().as_ref() == ITEM_TAG {
                    items.push(parse_item(reader)?);
                } else {
                    depth += 1;
                }
            }
            Event::Empty(e) => {
                if in_notification_ns(reader, e.name()) && e.local_name().as_ref() == ITEM_TAG {
                    bail!("notification item is missing eventCode");
                }
            }
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Event::Eof => bail!("notification payload is truncated"),
            _ => {}
        }
    }

    Ok(items)
}

fn parse_item(reader: &mut NsReader<&[u8]>) -> Result<NotificationItem, Error> {
    let mut event_code: Option<String> = None;
    let mut psp_reference: Option<String> = None;
    let mut original_reference = None;
    let mut success = false;
    let mut reason = None;
    let mut merchant_reference = String::new();
    let mut merchant_account_code = String::new();
    let mut additional_data = HashMap::new();

    loop {
        match read(reader)? {
            Event::Start(e) => {
                if !in_notification_ns(reader, e.name()) {
                    reader
                        .read_to_end(e.name())
                        .map_err(|err| anyhow!("malformed notification XML: {}", err))?;
                    continue;
                }

                match e.local_name().as_ref() {
                    b"eventCode" => event_code = Some(element_text(reader, &e)?),
                    b"pspReference" => psp_reference = Some(element_text(reader, &e)?),
                    b"originalReference" => {
                        original_reference = non_empty(element_text(reader, &e)?);
                    }
                    b"success" => {
                        success = element_text(reader, &e)?.trim().eq_ignore_ascii_case("true");
                    }
                    b"reason" => reason = non_empty(element_text(reader, &e)?),
                    b"merchantReference" => merchant_reference = element_text(reader, &e)?,
                    b"merchantAccountCode" => merchant_account_code = element_text(reader, &e)?,
                    b"additionalData" => parse_additional_data(reader, &mut additional_data)?,
                    other => {
                        // The additional-data bag is the schema's extension
                        // point; unrecognized simple elements land there.
                        let key = String::from_utf8_lossy(other).into_owned();
                        additional_data.insert(key, element_text(reader, &e)?);
                    }
                }
            }
            Event::End(e) if e.local_name().as_ref() == ITEM_TAG => break,
            Event::Eof => bail!("notification item is truncated"),
            _ => {}
        }
    }

    let event_code = event_code
        .filter(|code| !code.is_empty())
        .ok_or_else(|| anyhow!("notification item is missing eventCode"))?;
    let psp_reference = psp_reference
        .filter(|psp| !psp.is_empty())
        .ok_or_else(|| anyhow!("notification item is missing pspReference"))?;

    Ok(NotificationItem {
        event_code,
        psp_reference,
        original_reference,
        success,
        reason,
        merchant_reference,
        merchant_account_code,
        additional_data,
    })
}

fn parse_additional_data(
    reader: &mut NsReader<&[u8]>,
    bag: &mut HashMap<String, String>,
) -> Result<(), Error> {
    let mut key = None;
    let mut value = None;

    loop {
        match read(reader)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"entry" => {
                    key = None;
                    value = None;
                }
                b"key" => key = Some(element_text(reader, &e)?),
                b"value" => value = Some(element_text(reader, &e)?),
                _ => {
                    reader
                        .read_to_end(e.name())
                        .map_err(|err| anyhow!("malformed notification XML: {}", err))?;
                }
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"entry" => {
                    if let (Some(key), Some(value)) = (key.take(), value.take()) {
                        bag.insert(key, value);
                    }
                }
                b"additionalData" => break,
                _ => {}
            },
            Event::Eof => bail!("additionalData element is not closed"),
            _ => {}
        }
    }

    Ok(())
}

/// Collects the text content of the element opened by `start`, skipping any
/// nested markup, and consumes the matching end tag.
fn element_text(reader: &mut NsReader<&[u8]>, start: &BytesStart) -> Result<String, Error> {
    let mut text = String::new();

    loop {
        match read(reader)? {
            Event::Text(t) => {
                let unescaped = t
                    .unescape()
                    .map_err(|e| anyhow!("malformed notification XML: {}", e))?;
                text.push_str(&unescaped);
            }
            Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c)),
            Event::Start(inner) => {
                reader
                    .read_to_end(inner.name())
                    .map_err(|e| anyhow!("malformed notification XML: {}", e))?;
            }
            Event::End(_) => break,
            Event::Eof => bail!(
                "element <{}> is not closed",
                String::from_utf8_lossy(start.name().as_ref())
            ),
            _ => {}
        }
    }

    Ok(text)
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() { None } else { Some(text) }
}
