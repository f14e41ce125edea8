mod common;

use common::*;
use paybot::application::workflow::Submission;
use paybot::domain::chat::{ChatId, Sender, UserId};
use paybot::domain::order::{OrderStatus, TransitionPolicy};
use paybot::domain::ports::OrderStore;
use paybot::domain::reference::ReferenceCode;
use rand::Rng;
use rand::distributions::Alphanumeric;

fn random_digits(rng: &mut impl Rng, len: usize) -> String {
    (0..len)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

#[tokio::test]
async fn test_every_twelve_digit_string_creates_one_pending_order() {
    let h = harness(TransitionPolicy::Lenient);
    let mut rng = rand::thread_rng();

    for i in 0..200 {
        let user = Sender::new(1000 + i);
        let utr = random_digits(&mut rng, 12);

        let submission = h
            .workflow
            .submit_reference(&user, ChatId(user.id.0), &utr)
            .await
            .unwrap();
        assert!(matches!(submission, Submission::Accepted(_)), "{utr} rejected");

        let orders = h.store.find_by_user(user.id).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].status, OrderStatus::Pending);
        assert_eq!(orders[0].utr.as_str(), utr);
    }
}

#[tokio::test]
async fn test_wrong_length_digit_strings_are_rejected() {
    let h = harness(TransitionPolicy::Lenient);
    let mut rng = rand::thread_rng();

    for _ in 0..200 {
        let len = loop {
            let len = rng.gen_range(0..25);
            if len != 12 {
                break len;
            }
        };
        let utr = random_digits(&mut rng, len);

        let submission = h
            .workflow
            .submit_reference(&alice(), ChatId(42), &utr)
            .await
            .unwrap();
        assert_eq!(submission, Submission::Rejected, "{utr:?} accepted");
    }

    assert!(h.store.find_by_user(UserId(42)).await.unwrap().is_empty());
}

#[test]
fn test_twelve_chars_with_a_non_digit_are_rejected() {
    let mut rng = rand::thread_rng();

    for _ in 0..500 {
        let mut chars: Vec<char> = random_digits(&mut rng, 12).chars().collect();
        let position = rng.gen_range(0..12);
        chars[position] = loop {
            let c = char::from(rng.sample(Alphanumeric));
            if !c.is_ascii_digit() {
                break c;
            }
        };
        let candidate: String = chars.into_iter().collect();

        assert!(ReferenceCode::parse(&candidate).is_err(), "{candidate:?} accepted");
    }
}

#[test]
fn test_random_unicode_is_rejected_unless_twelve_ascii_digits() {
    let mut rng = rand::thread_rng();

    for _ in 0..500 {
        let len = rng.gen_range(1..20);
        let candidate: String = (0..len).map(|_| rng.r#gen::<char>()).collect();
        let expected = {
            let trimmed = candidate.trim();
            trimmed.len() == 12 && trimmed.bytes().all(|b| b.is_ascii_digit())
        };

        assert_eq!(ReferenceCode::parse(&candidate).is_ok(), expected, "{candidate:?}");
    }
}
