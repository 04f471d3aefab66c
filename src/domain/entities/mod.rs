//! Domain entity definitions.

mod attachment;
mod channel;
mod image;
mod message;
mod metadata;
mod token;

pub use attachment::{Attachment, ContentType};
pub use channel::ChannelId;
pub use image::{Image, PROCESSED_EXTENSION};
pub use message::{Message, MessageAttachment, MessageAuthor, MessageId};
pub use metadata::{AttachmentMetadata, LitematicMeta, VideoMeta, WorldSaveMeta};
pub use token::BotToken;
