/*
 * Copyright Stalwart Labs Ltd. See the COPYING
 * file at the top-level directory of this distribution.
 *
 * Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
 * https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
 * <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
 * option. This file may not be copied, modified, or distributed
 * except according to those terms.
 */

use std::{
    io,
    path::{Path, PathBuf},
};

use mail_builder::MessageBuilder;

use crate::smtp::message::Message;

pub const SUBJECT_PREFIX: &str = "Arm Photo Booth — ";
pub const BODY: &str = "This is the photo from the Arm Demo Photo Booth";

/// A file read from disk, ready to be attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub path: PathBuf,
    pub filename: String,
    pub content_type: String,
    pub contents: Vec<u8>,
}

impl Attachment {
    /// Reads the file at `path`. Anything other than a regular file is
    /// reported as `NotFound`.
    pub fn load(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not a file", path.display()),
            ));
        }

        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Ok(Attachment {
            contents: std::fs::read(path)?,
            path: path.to_path_buf(),
            filename,
            content_type,
        })
    }
}

/// Builds the booth message: a plain-text part followed by the attachment.
pub fn compose(
    sender: &str,
    recipient: &str,
    name: &str,
    attachment: &Attachment,
) -> crate::Result<Message<'static>> {
    let subject = format!("{SUBJECT_PREFIX}{name}");

    let body = MessageBuilder::new()
        .from(sender)
        .to(recipient)
        .subject(subject.as_str())
        .text_body(BODY)
        .attachment(
            attachment.content_type.as_str(),
            attachment.filename.as_str(),
            attachment.contents.as_slice(),
        )
        .write_to_vec()?;

    Ok(Message::new(
        sender.to_string(),
        [recipient.to_string()],
        body,
    ))
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use mail_parser::{MessageParser, MimeHeaders};

    use super::{compose, Attachment, BODY};

    fn jpeg_fixture() -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame_0001.jpg");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&[0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10, b'.', b'\r', b'\n', b'.'])
            .unwrap();
        (dir, path)
    }

    #[test]
    fn load_attachment() {
        let (_dir, path) = jpeg_fixture();
        let attachment = Attachment::load(&path).unwrap();

        assert_eq!(attachment.filename, "frame_0001.jpg");
        assert_eq!(attachment.content_type, "image/jpeg");
        assert_eq!(attachment.contents.len(), 10);
    }

    #[test]
    fn unknown_extension_is_octet_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.booth");
        std::fs::write(&path, b"raw").unwrap();

        assert_eq!(
            Attachment::load(&path).unwrap().content_type,
            "application/octet-stream"
        );
    }

    #[test]
    fn missing_attachment() {
        let dir = tempfile::tempdir().unwrap();

        for path in [dir.path().join("nope.jpg"), dir.path().to_path_buf()] {
            assert_eq!(
                Attachment::load(&path).unwrap_err().kind(),
                std::io::ErrorKind::NotFound
            );
        }
    }

    #[test]
    fn one_text_part_and_one_attachment() {
        let (_dir, path) = jpeg_fixture();
        let attachment = Attachment::load(&path).unwrap();

        let message = compose(
            "booth@example.com",
            "jane@example.com",
            "Jane Doe",
            &attachment,
        )
        .unwrap();
        assert_eq!(message.mail_from, "booth@example.com");
        assert_eq!(message.rcpt_to, vec!["jane@example.com"]);

        let parsed = MessageParser::default().parse(&message.body[..]).unwrap();
        assert_eq!(parsed.subject(), Some("Arm Photo Booth — Jane Doe"));
        assert_eq!(
            parsed
                .from()
                .and_then(|addr| addr.first())
                .and_then(|addr| addr.address()),
            Some("booth@example.com")
        );
        assert_eq!(
            parsed
                .to()
                .and_then(|addr| addr.first())
                .and_then(|addr| addr.address()),
            Some("jane@example.com")
        );

        assert_eq!(parsed.text_body_count(), 1);
        assert_eq!(parsed.body_text(0).unwrap().trim_end(), BODY);

        assert_eq!(parsed.attachment_count(), 1);
        let part = parsed.attachment(0).unwrap();
        assert_eq!(part.attachment_name(), Some("frame_0001.jpg"));
        let content_type = part.content_type().unwrap();
        assert_eq!(content_type.ctype(), "image");
        assert_eq!(content_type.subtype(), Some("jpeg"));
        assert_eq!(part.contents(), attachment.contents.as_slice());
    }
}
