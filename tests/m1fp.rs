use m1fp::{
    Ciphertext, DecryptionKey, DomainParams, EncryptionKey, M1fpError, Randomizer, DEFAULT_X,
    MAX_VOTE,
};
use rand::{RngCore, SeedableRng};
use unknown_order::BigNumber;

fn keypair() -> (DecryptionKey, EncryptionKey) {
    let res = DecryptionKey::random(DomainParams::default(), DEFAULT_X);
    assert!(res.is_ok());
    let sk = res.unwrap();
    let pk = EncryptionKey::from(&sk);
    (sk, pk)
}

fn r(v: u64) -> Randomizer {
    BigNumber::from(v)
}

#[test]
fn encrypt_decrypt_votes() {
    let (sk, pk) = keypair();

    for vote in [0u64, 1, 17, 42, MAX_VOTE] {
        let res = pk.encrypt_vote(vote);
        assert!(res.is_ok());
        let (ct, _) = res.unwrap();
        let res = sk.decrypt_vote(&ct);
        assert!(res.is_ok());
        assert_eq!(res.unwrap(), vote);
    }

    let res = pk.encrypt_vote(MAX_VOTE + 1);
    assert!(res.is_err());
}

#[test]
fn two_vote_sum() {
    let (sk, pk) = keypair();

    let ct1 = pk.encrypt_vote_with_randomizer(1, &r(1_234_567)).unwrap();
    let ct2 = pk.encrypt_vote_with_randomizer(63, &r(7_654_321)).unwrap();

    let sum = ct1.add(&ct2).unwrap();
    assert_eq!(sk.decrypt_vote(&sum).unwrap(), 64);
}

#[test]
fn two_byte_message_sum() {
    // the byte codec path: 1 ⊕ 63 decrypts to '@'
    let (sk, pk) = keypair();

    let ct1 = pk.encrypt_with_randomizer([1u8], &r(1_234_567)).unwrap();
    let ct2 = pk.encrypt_with_randomizer([63u8], &r(7_654_321)).unwrap();

    let sum = ct1.add(&ct2).unwrap();
    assert_eq!(sk.decrypt(&sum).unwrap(), b"\x40");
}

#[test]
fn five_votes_add_many() {
    let (sk, pk) = keypair();
    let mut rng = rand_chacha::ChaCha8Rng::from_seed([3u8; 32]);

    let mut expected = 0u64;
    let mut cts = Vec::with_capacity(5);
    for i in 0..5u64 {
        let vote = u64::from(rng.next_u32() % 65);
        expected += vote;
        let ct = pk
            .encrypt_vote_with_randomizer(vote, &r(1_000_000 + 100_000 * i))
            .unwrap();
        cts.push(ct);
    }

    let tally = Ciphertext::add_many(&cts).unwrap();
    assert_eq!(sk.decrypt_vote(&tally).unwrap(), expected % 1_000_000_000);
}

#[test]
fn thousand_sequential_votes() {
    let (sk, pk) = keypair();

    let mut expected = 0u64;
    let mut tally: Option<Ciphertext> = None;
    for i in 0..1000u64 {
        let vote = i % 65;
        expected += vote;
        let ct = pk.encrypt_vote_with_randomizer(vote, &r(i + 1)).unwrap();
        tally = Some(match tally {
            None => ct,
            Some(acc) => acc.add(&ct).unwrap(),
        });
    }

    assert_eq!(sk.decrypt_vote(&tally.unwrap()).unwrap(), expected);
}

#[test]
fn hundred_thousand_votes_exact() {
    // the headline property: zero drift across a large tally
    let (sk, pk) = keypair();
    let mut rng = rand_chacha::ChaCha8Rng::from_seed([7u8; 32]);

    let mut expected = 0u64;
    let mut tally: Option<Ciphertext> = None;
    for i in 0..100_000u64 {
        let vote = u64::from(rng.next_u32() % 65);
        expected += vote;
        let ct = pk.encrypt_vote_with_randomizer(vote, &r(i + 1)).unwrap();
        tally = Some(match tally {
            None => ct,
            Some(acc) => acc.add(&ct).unwrap(),
        });
    }

    assert_eq!(sk.decrypt_vote(&tally.unwrap()).unwrap(), expected);
}

#[test]
fn byte_string_round_trip() {
    // "Hello" needs 15 digit positions, so a wider domain
    let params = DomainParams::new(256, 15).unwrap();
    let sk = DecryptionKey::random(params, DEFAULT_X).unwrap();
    let pk = EncryptionKey::from(&sk);

    let res = pk.encrypt(b"Hello");
    assert!(res.is_ok());
    let (ct, _) = res.unwrap();
    assert_eq!(sk.decrypt(&ct).unwrap(), b"Hello");

    // under the default nine-digit domain the same message is too long
    let (_, pk9) = keypair();
    let res = pk9.encrypt(b"Hello");
    assert!(matches!(res, Err(M1fpError::PlaintextTooLong(15))));
}

#[test]
fn boundary_messages() {
    let (sk, pk) = keypair();

    let ct = pk.encrypt_digits_with_randomizer("0", &r(5)).unwrap();
    assert_eq!(sk.decrypt_digits(&ct).unwrap(), "000000000");

    let ct = pk
        .encrypt_digits_with_randomizer("999999999", &r(5))
        .unwrap();
    assert_eq!(sk.decrypt_digits(&ct).unwrap(), "999999999");
}

#[test]
fn overflow_wraps_modulo_ten_pow_n() {
    let (sk, pk) = keypair();

    let ct1 = pk
        .encrypt_digits_with_randomizer("999999999", &r(11))
        .unwrap();
    let ct2 = pk.encrypt_digits_with_randomizer("1", &r(13)).unwrap();

    // the sum reduces modulo 10^9, it does not error
    let sum = ct1.add(&ct2).unwrap();
    assert_eq!(sk.decrypt_digits(&sum).unwrap(), "000000000");
    assert_eq!(sk.decrypt_vote(&sum).unwrap(), 0);
}

#[test]
fn addition_is_commutative_and_associative() {
    let (_, pk) = keypair();

    let a = pk.encrypt_vote_with_randomizer(3, &r(101)).unwrap();
    let b = pk.encrypt_vote_with_randomizer(7, &r(202)).unwrap();
    let c = pk.encrypt_vote_with_randomizer(11, &r(303)).unwrap();

    // bit-exact equality on (C1, C2)
    assert_eq!(a.add(&b).unwrap(), b.add(&a).unwrap());
    assert_eq!(
        a.add(&b).unwrap().add(&c).unwrap(),
        a.add(&b.add(&c).unwrap()).unwrap()
    );
}

#[test]
fn deterministic_encryption_is_pure() {
    let (_, pk) = keypair();

    let ct1 = pk.encrypt_vote_with_randomizer(42, &r(12_345)).unwrap();
    let ct2 = pk.encrypt_vote_with_randomizer(42, &r(12_345)).unwrap();
    assert_eq!(ct1, ct2);

    let ct3 = pk.encrypt_vote_with_randomizer(42, &r(12_346)).unwrap();
    assert_ne!(ct1, ct3);
}

#[test]
fn fresh_encryptions_have_no_residue() {
    // strict decryption refuses any fractional residue, so passing it
    // proves the unscaled message divides out exactly
    let (sk, pk) = keypair();

    let ct = pk.encrypt_vote_with_randomizer(42, &r(12_345)).unwrap();
    assert_eq!(sk.decrypt_digits_strict(&ct).unwrap(), "000000042");
    assert_eq!(sk.decrypt_vote_strict(&ct).unwrap(), 42);

    let sum = ct.add(&ct).unwrap();
    assert_eq!(sk.decrypt_digits_strict(&sum).unwrap(), "000000084");

    let ct = pk.encrypt_with_randomizer(b"ok", &r(808)).unwrap();
    assert_eq!(sk.decrypt_strict(&ct).unwrap(), b"ok");
}

#[test]
fn minimal_precision_works() {
    let params = DomainParams::new(128, 9).unwrap();
    let sk = DecryptionKey::random(params, DEFAULT_X).unwrap();
    let pk = EncryptionKey::from(&sk);

    let ct = pk.encrypt_vote_with_randomizer(19, &r(99)).unwrap();
    assert_eq!(sk.decrypt_vote(&ct).unwrap(), 19);
}

#[test]
fn bad_parameters_are_rejected() {
    assert!(matches!(
        DomainParams::new(100, 9),
        Err(M1fpError::PrecisionTooSmall(100))
    ));
    assert!(matches!(
        DomainParams::new(256, 300),
        Err(M1fpError::PrecisionTooSmall(256))
    ));

    // malformed irrationals
    let params = DomainParams::default();
    assert!(DecryptionKey::random(params, "1.5").is_err());
    assert!(DecryptionKey::random(params, "0.000").is_err());
    assert!(DecryptionKey::random(params, "irrational").is_err());
    // not enough mantissa for 256 bits
    assert!(DecryptionKey::random(params, "0.5").is_err());

    let (_, pk) = keypair();
    assert!(matches!(
        pk.encrypt_digits("1234567890"),
        Err(M1fpError::PlaintextTooLong(10))
    ));
    assert!(matches!(
        pk.encrypt_digits("12345678x"),
        Err(M1fpError::MalformedPlaintext)
    ));
    assert!(matches!(
        pk.encrypt_vote(65),
        Err(M1fpError::VoteOutOfRange(65))
    ));
}

#[test]
fn domain_mismatch_is_detected() {
    let (sk9, pk9) = keypair();
    let params = DomainParams::new(256, 15).unwrap();
    let sk15 = DecryptionKey::random(params, DEFAULT_X).unwrap();
    let pk15 = EncryptionKey::from(&sk15);

    let ct9 = pk9.encrypt_vote_with_randomizer(1, &r(7)).unwrap();
    let ct15 = pk15.encrypt_vote_with_randomizer(1, &r(7)).unwrap();

    assert!(matches!(ct9.add(&ct15), Err(M1fpError::DomainMismatch)));
    assert!(matches!(
        sk15.decrypt_vote(&ct9),
        Err(M1fpError::DomainMismatch)
    ));
    assert!(matches!(
        sk9.decrypt_vote(&ct15),
        Err(M1fpError::DomainMismatch)
    ));
}

#[test]
fn empty_aggregation_fails() {
    let (_, pk) = keypair();

    let empty: [&Ciphertext; 0] = [];
    let res = Ciphertext::add_many(empty);
    assert!(matches!(res, Err(M1fpError::EmptyAggregation)));

    let ct = pk.encrypt_vote_with_randomizer(5, &r(1)).unwrap();
    let folded = Ciphertext::add_many([&ct]).unwrap();
    assert_eq!(folded, ct);
}

#[test]
fn public_key_blob_round_trip() {
    let (sk, pk) = keypair();

    let blob = pk.to_bytes();
    let res = EncryptionKey::from_bytes(&blob);
    assert!(res.is_ok());
    let pk1 = res.unwrap();
    assert_eq!(pk1, pk);

    // encrypt under the unmarshalled key, decrypt with the original
    let ct = pk1.encrypt_vote_with_randomizer(33, &r(404)).unwrap();
    assert_eq!(sk.decrypt_vote(&ct).unwrap(), 33);

    // damaged blobs are rejected
    assert!(EncryptionKey::from_bytes(&blob[..blob.len() - 1]).is_err());
    let mut truncated = blob.clone();
    truncated.push(0);
    assert!(EncryptionKey::from_bytes(&truncated).is_err());
    assert!(EncryptionKey::from_bytes([0u8; 0]).is_err());
}

#[test]
fn decryption_key_bytes_round_trip() {
    let (sk, pk) = keypair();

    let bytes = sk.to_bytes();
    let res = DecryptionKey::from_bytes(&bytes);
    assert!(res.is_ok());
    let sk1 = res.unwrap();
    assert_eq!(sk1, sk);

    let ct = pk.encrypt_vote_with_randomizer(21, &r(55)).unwrap();
    assert_eq!(sk1.decrypt_vote(&ct).unwrap(), 21);
}

#[test]
fn serialization() {
    let (sk, pk) = keypair();

    let res = serde_json::to_string(&pk);
    assert!(res.is_ok());
    let pk_str = res.unwrap();
    let res = serde_json::from_str::<EncryptionKey>(&pk_str);
    assert!(res.is_ok());
    assert_eq!(res.unwrap(), pk);

    let res = serde_json::to_string(&sk);
    assert!(res.is_ok());
    let sk_str = res.unwrap();
    let res = serde_json::from_str::<DecryptionKey>(&sk_str);
    assert!(res.is_ok());
    assert_eq!(res.unwrap(), sk);
}

#[test]
fn from_rng_is_reproducible() {
    let params = DomainParams::default();
    let mut rng1 = rand_chacha::ChaCha8Rng::from_seed([9u8; 32]);
    let mut rng2 = rand_chacha::ChaCha8Rng::from_seed([9u8; 32]);

    let sk1 = DecryptionKey::from_rng(params, DEFAULT_X, &mut rng1).unwrap();
    let sk2 = DecryptionKey::from_rng(params, DEFAULT_X, &mut rng2).unwrap();
    assert_eq!(sk1, sk2);

    // a different seed draws a different secret scalar
    let mut rng3 = rand_chacha::ChaCha8Rng::from_seed([10u8; 32]);
    let sk3 = DecryptionKey::from_rng(params, DEFAULT_X, &mut rng3).unwrap();
    assert_ne!(sk1, sk3);
}
