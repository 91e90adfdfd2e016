//! Every built-in scheme, driven through the standard registry.

use ed25519_dalek::Signer as _;
use rand_chacha::{ChaCha20Rng, rand_core::SeedableRng};
use rsa::{RsaPrivateKey, traits::PublicKeyParts};
use serde_json::json;
use sha2::Sha256;
use signature::{SignatureEncoding, Signer};
use tessera_abi::TypedData;
use tessera_signature::{
    Domain, Payload, Principal, Registry, Scheme, SignatureEnvelope, VerifyError,
    algorithm::{Ed25519DidKey, ethereum_address, owner_address},
};
use testresult::TestResult;

fn domain() -> Domain {
    Domain::new("tessera", "1", "registry-test")
}

fn payload(amount: u64) -> Result<Payload, serde_json::Error> {
    Payload::new("transfer", &json!({ "to": "0xabc", "amount": amount }), 1)
}

fn data(amount: u64) -> Result<TypedData, serde_json::Error> {
    Ok(payload(amount)?.typed_data(&domain()))
}

/// Verify `envelope` for both the signed payload and a tampered one.
async fn check(
    scheme: Scheme,
    envelope: &SignatureEnvelope,
) -> TestResult<(Principal, Result<Principal, VerifyError>)> {
    let registry = Registry::standard();
    let valid = registry
        .verify(scheme, &payload(1)?, envelope, &domain())
        .await?;
    let tampered = registry
        .verify(scheme, &payload(1_000)?, envelope, &domain())
        .await;
    Ok((valid, tampered))
}

#[tokio::test]
async fn it_verifies_secp256k1_signatures() -> TestResult {
    let key = k256::ecdsa::SigningKey::from_slice(&[11u8; 32])?;
    let expected = ethereum_address(key.verifying_key());

    for (scheme, digest) in [
        (Scheme::Secp256k1, data(1)?.signing_hash()?),
        (Scheme::Secp256k1Legacy, data(1)?.personal_hash()?),
    ] {
        let (signature, recovery) = key.sign_prehash_recoverable(digest.as_slice())?;
        let mut bytes = signature.to_bytes().to_vec();
        bytes.push(recovery.to_byte());
        let envelope = SignatureEnvelope::new(scheme, bytes, expected.as_str(), 1);

        let (valid, tampered) = check(scheme, &envelope).await?;
        assert_eq!(valid, expected);
        assert!(tampered.map_or(true, |principal| principal != expected));
    }
    Ok(())
}

#[tokio::test]
async fn it_verifies_ed25519_signatures() -> TestResult {
    let key = ed25519_dalek::SigningKey::from_bytes(&[12u8; 32]);
    let did = Ed25519DidKey(key.verifying_key()).to_string();
    let signature = key.sign(data(1)?.signing_hash()?.as_slice());
    let envelope =
        SignatureEnvelope::new(Scheme::Ed25519, signature.to_bytes().to_vec(), &did, 1);

    let (valid, tampered) = check(Scheme::Ed25519, &envelope).await?;
    assert_eq!(valid.as_str(), did);
    assert!(matches!(tampered, Err(VerifyError::Invalid(Scheme::Ed25519))));
    Ok(())
}

#[tokio::test]
async fn it_verifies_rsa_signatures() -> TestResult {
    let mut rng = ChaCha20Rng::seed_from_u64(42);
    let key = RsaPrivateKey::new(&mut rng, 2048)?;
    let signing_key = rsa::pkcs1v15::SigningKey::<Sha256>::new(key.clone());
    let signature = signing_key.sign(&data(1)?.to_json_bytes()?);
    let envelope = SignatureEnvelope::new(Scheme::Rsa256, signature.to_vec(), "owner", 1)
        .with_public_key(key.n().to_bytes_be());

    let (valid, tampered) = check(Scheme::Rsa256, &envelope).await?;
    assert_eq!(valid, owner_address(&key.to_public_key()));
    assert!(matches!(tampered, Err(VerifyError::Invalid(Scheme::Rsa256))));
    Ok(())
}
