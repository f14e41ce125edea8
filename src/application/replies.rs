//! Texts the bot sends.

use crate::domain::chat::{Sender, UserId, escape_html};
use crate::domain::price::Price;
use crate::domain::reference::ReferenceCode;

pub const WELCOME: &str = "👋 Welcome! To PicsArt Premium bot.\n\nTo get PicsArt Premium Click On /get.";
pub const INVALID_REFERENCE: &str = "❌ Invalid UTR. Please enter exactly 12 digits (numbers only).";
pub const REFERENCE_SAVED: &str = "🕒 UTR saved! Wait for admin approval.";
pub const NOT_AUTHORIZED: &str = "⛔ Not authorized";
pub const PAYMENT_REJECTED: &str = "❌ Payment rejected. Please contact admin if mistake.";
pub const APPROVE_LABEL: &str = "✅ Approve";
pub const REJECT_LABEL: &str = "❌ Reject";

/// Markdown caption that goes with the payment QR code.
pub fn payment_instructions(price: Price) -> String {
    format!(
        "💳 Pay **{price}** using the QR below.\n\n➡️ After payment, send your 12-digit UTR number here."
    )
}

/// HTML message asking the administrator to check a payment.
pub fn admin_review_request(sender: &Sender, utr: &ReferenceCode) -> String {
    format!(
        "📥 New Payment Request\n\n👤 User: {} (ID: {})\n💳 UTR: <code>{}</code>",
        sender.mention_html(),
        sender.id,
        escape_html(utr.as_str())
    )
}

pub fn payment_verified(content_link: &str) -> String {
    format!("✅ Payment verified!\nHere is your PicsArt Premium: {content_link}")
}

pub fn approved_user(user: UserId) -> String {
    format!("✅ Approved user {user}")
}

pub fn rejected_user(user: UserId) -> String {
    format!("❌ Rejected user {user}")
}

pub fn nothing_to_resolve(user: UserId) -> String {
    format!("ℹ️ No pending order for user {user}")
}
