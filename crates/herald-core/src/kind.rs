//! Structural document kinds and their relation tables.
//!
//! Every [`ResponseDocument`](crate::ResponseDocument) is tagged with a
//! [`DocumentKind`]. A kind declares which of its keys hold richer documents,
//! so that `typed_get("from")` on a message yields a `User`-kind document
//! instead of a generic one. Relations are plain static tables; nothing is
//! intercepted dynamically.

use std::fmt;

/// Declares that the value under `key` should be materialised as `target`.
///
/// Lists relate element-wise: every object inside an array under `key`
/// is tagged with `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub key: &'static str,
    pub target: DocumentKind,
}

const fn rel(key: &'static str, target: DocumentKind) -> Relation {
    Relation { key, target }
}

/// The structural type of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DocumentKind {
    /// No relations; plain nested data.
    #[default]
    Generic,
    Update,
    Message,
    User,
    Chat,
    MessageEntity,
    CallbackQuery,
    InlineQuery,
    ChosenInlineResult,
    ShippingQuery,
    ShippingAddress,
    PreCheckoutQuery,
    OrderInfo,
    Poll,
    PollOption,
    PollAnswer,
    ChatMemberUpdated,
    ChatMember,
    ChatInviteLink,
    ChatJoinRequest,
    PhotoSize,
    Audio,
    Animation,
    Document,
    Video,
    VideoNote,
    Voice,
    Sticker,
    Contact,
    Dice,
    Location,
    Venue,
    Invoice,
    SuccessfulPayment,
}

use DocumentKind as K;

const UPDATE_RELATIONS: &[Relation] = &[
    rel("message", K::Message),
    rel("edited_message", K::Message),
    rel("channel_post", K::Message),
    rel("edited_channel_post", K::Message),
    rel("business_message", K::Message),
    rel("edited_business_message", K::Message),
    rel("inline_query", K::InlineQuery),
    rel("chosen_inline_result", K::ChosenInlineResult),
    rel("callback_query", K::CallbackQuery),
    rel("shipping_query", K::ShippingQuery),
    rel("pre_checkout_query", K::PreCheckoutQuery),
    rel("poll", K::Poll),
    rel("poll_answer", K::PollAnswer),
    rel("my_chat_member", K::ChatMemberUpdated),
    rel("chat_member", K::ChatMemberUpdated),
    rel("chat_join_request", K::ChatJoinRequest),
];

const MESSAGE_RELATIONS: &[Relation] = &[
    rel("from", K::User),
    rel("sender_chat", K::Chat),
    rel("chat", K::Chat),
    rel("forward_from", K::User),
    rel("forward_from_chat", K::Chat),
    rel("reply_to_message", K::Message),
    rel("pinned_message", K::Message),
    rel("via_bot", K::User),
    rel("entities", K::MessageEntity),
    rel("caption_entities", K::MessageEntity),
    rel("audio", K::Audio),
    rel("animation", K::Animation),
    rel("document", K::Document),
    rel("photo", K::PhotoSize),
    rel("sticker", K::Sticker),
    rel("video", K::Video),
    rel("video_note", K::VideoNote),
    rel("voice", K::Voice),
    rel("contact", K::Contact),
    rel("dice", K::Dice),
    rel("poll", K::Poll),
    rel("venue", K::Venue),
    rel("location", K::Location),
    rel("new_chat_members", K::User),
    rel("left_chat_member", K::User),
    rel("new_chat_photo", K::PhotoSize),
    rel("invoice", K::Invoice),
    rel("successful_payment", K::SuccessfulPayment),
];

const CHAT_RELATIONS: &[Relation] = &[rel("pinned_message", K::Message)];

const ENTITY_RELATIONS: &[Relation] = &[rel("user", K::User)];

const CALLBACK_QUERY_RELATIONS: &[Relation] =
    &[rel("from", K::User), rel("message", K::Message)];

const INLINE_QUERY_RELATIONS: &[Relation] =
    &[rel("from", K::User), rel("location", K::Location)];

const SHIPPING_QUERY_RELATIONS: &[Relation] = &[
    rel("from", K::User),
    rel("shipping_address", K::ShippingAddress),
];

const PRE_CHECKOUT_RELATIONS: &[Relation] =
    &[rel("from", K::User), rel("order_info", K::OrderInfo)];

const ORDER_INFO_RELATIONS: &[Relation] = &[rel("shipping_address", K::ShippingAddress)];

const POLL_RELATIONS: &[Relation] = &[rel("options", K::PollOption)];

const POLL_ANSWER_RELATIONS: &[Relation] =
    &[rel("user", K::User), rel("voter_chat", K::Chat)];

const MEMBER_UPDATED_RELATIONS: &[Relation] = &[
    rel("chat", K::Chat),
    rel("from", K::User),
    rel("old_chat_member", K::ChatMember),
    rel("new_chat_member", K::ChatMember),
    rel("invite_link", K::ChatInviteLink),
];

const CHAT_MEMBER_RELATIONS: &[Relation] = &[rel("user", K::User)];

const INVITE_LINK_RELATIONS: &[Relation] = &[rel("creator", K::User)];

const JOIN_REQUEST_RELATIONS: &[Relation] = &[
    rel("chat", K::Chat),
    rel("from", K::User),
    rel("invite_link", K::ChatInviteLink),
];

const THUMBNAIL_RELATIONS: &[Relation] = &[rel("thumbnail", K::PhotoSize)];

const VENUE_RELATIONS: &[Relation] = &[rel("location", K::Location)];

const PAYMENT_RELATIONS: &[Relation] = &[rel("order_info", K::OrderInfo)];

impl DocumentKind {
    /// The relation table declared by this kind.
    pub fn relations(self) -> &'static [Relation] {
        match self {
            K::Update => UPDATE_RELATIONS,
            K::Message => MESSAGE_RELATIONS,
            K::Chat => CHAT_RELATIONS,
            K::MessageEntity => ENTITY_RELATIONS,
            K::CallbackQuery => CALLBACK_QUERY_RELATIONS,
            K::InlineQuery | K::ChosenInlineResult => INLINE_QUERY_RELATIONS,
            K::ShippingQuery => SHIPPING_QUERY_RELATIONS,
            K::PreCheckoutQuery => PRE_CHECKOUT_RELATIONS,
            K::OrderInfo => ORDER_INFO_RELATIONS,
            K::Poll => POLL_RELATIONS,
            K::PollAnswer => POLL_ANSWER_RELATIONS,
            K::ChatMemberUpdated => MEMBER_UPDATED_RELATIONS,
            K::ChatMember => CHAT_MEMBER_RELATIONS,
            K::ChatInviteLink => INVITE_LINK_RELATIONS,
            K::ChatJoinRequest => JOIN_REQUEST_RELATIONS,
            K::Audio | K::Animation | K::Document | K::Video | K::VideoNote | K::Sticker => {
                THUMBNAIL_RELATIONS
            }
            K::Venue => VENUE_RELATIONS,
            K::SuccessfulPayment => PAYMENT_RELATIONS,
            K::Generic
            | K::User
            | K::ShippingAddress
            | K::PollOption
            | K::PhotoSize
            | K::Voice
            | K::Contact
            | K::Dice
            | K::Location
            | K::Invoice => &[],
        }
    }

    /// Looks up the relation declared for `key`, if any.
    pub fn relation(self, key: &str) -> Option<&'static Relation> {
        self.relations().iter().find(|r| r.key == key)
    }

    /// Human-readable name, matching the platform's object names.
    pub fn name(self) -> &'static str {
        match self {
            K::Generic => "Generic",
            K::Update => "Update",
            K::Message => "Message",
            K::User => "User",
            K::Chat => "Chat",
            K::MessageEntity => "MessageEntity",
            K::CallbackQuery => "CallbackQuery",
            K::InlineQuery => "InlineQuery",
            K::ChosenInlineResult => "ChosenInlineResult",
            K::ShippingQuery => "ShippingQuery",
            K::ShippingAddress => "ShippingAddress",
            K::PreCheckoutQuery => "PreCheckoutQuery",
            K::OrderInfo => "OrderInfo",
            K::Poll => "Poll",
            K::PollOption => "PollOption",
            K::PollAnswer => "PollAnswer",
            K::ChatMemberUpdated => "ChatMemberUpdated",
            K::ChatMember => "ChatMember",
            K::ChatInviteLink => "ChatInviteLink",
            K::ChatJoinRequest => "ChatJoinRequest",
            K::PhotoSize => "PhotoSize",
            K::Audio => "Audio",
            K::Animation => "Animation",
            K::Document => "Document",
            K::Video => "Video",
            K::VideoNote => "VideoNote",
            K::Voice => "Voice",
            K::Sticker => "Sticker",
            K::Contact => "Contact",
            K::Dice => "Dice",
            K::Location => "Location",
            K::Venue => "Venue",
            K::Invoice => "Invoice",
            K::SuccessfulPayment => "SuccessfulPayment",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
