use tracing::debug;

use super::keys::KeyMaterial;
use crate::dns::rdata::Ds;
use crate::dnssec::DigestType;

/// Compare the first KSK's digest with every advertised DS digest. Starts
/// true and turns false on the first mismatch or unsupported digest type;
/// stays true when there is no KSK to check.
pub fn cross_check(keys: &KeyMaterial, ds_records: &[&Ds]) -> bool {
    let Some(ksk) = keys.first_ksk() else {
        debug!("No KSK fetched, DS cross-check is vacuously true");
        return true;
    };

    ds_records.iter().all(|ds| match DigestType::from_u8(ds.digest_type) {
        Some(digest_type) => {
            let matches = ksk.ds_digest(digest_type) == ds.digest;
            if !matches {
                debug!("KSK {} does not match DS {}", ksk.key_tag(), ds.key_tag);
            }
            matches
        }
        None => {
            debug!("Unsupported DS digest type {}", ds.digest_type);
            false
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::{
        name::DomainName,
        rdata::{Dnskey, RData},
        resource::DNSResource,
    };

    fn material(flags: u16) -> KeyMaterial {
        let record = DNSResource::new(
            DomainName::parse("example.com").unwrap(),
            3600,
            RData::DNSKEY(Dnskey {
                flags,
                protocol: 3,
                algorithm: 15,
                public_key: vec![0x42; 32],
            }),
        );
        KeyMaterial::from_answers(&[record])
    }

    fn ds_for(keys: &KeyMaterial, digest_type: DigestType) -> Ds {
        let ksk = &keys.keys[0];
        Ds {
            key_tag: ksk.key_tag(),
            algorithm: 15,
            digest_type: digest_type.to_u8(),
            digest: ksk.ds_digest(digest_type),
        }
    }

    #[test]
    fn test_every_digest_must_match() {
        let keys = material(257);
        let good = ds_for(&keys, DigestType::Sha384);
        let mut bad = ds_for(&keys, DigestType::Sha256);
        bad.digest[0] ^= 1;
        let also_good = ds_for(&keys, DigestType::Sha1);

        assert!(cross_check(&keys, &[&good]));
        assert!(cross_check(&keys, &[&good, &also_good]));
        assert!(!cross_check(&keys, &[&bad]));
        assert!(!cross_check(&keys, &[&bad, &good]));
        assert!(!cross_check(&keys, &[&good, &bad]));
    }

    #[test]
    fn test_unsupported_digest_type_never_matches() {
        let keys = material(257);
        let mut ds = ds_for(&keys, DigestType::Sha256);
        ds.digest_type = 3;
        assert!(!cross_check(&keys, &[&ds]));
    }

    #[test]
    fn test_without_ksk_is_vacuously_true() {
        let keys = material(256);
        let ds = Ds {
            key_tag: 1,
            algorithm: 15,
            digest_type: 2,
            digest: vec![0; 32],
        };
        assert!(cross_check(&keys, &[&ds]));
        assert!(cross_check(&KeyMaterial::default(), &[&ds]));
    }
}
