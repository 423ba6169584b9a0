use rand::Rng;
use uuid::{Uuid, Variant, Version};

pub fn make_uuid(rng: &mut impl Rng) -> Uuid {
    uuid::Builder::from_u128(rng.random::<u128>())
        .with_variant(Variant::RFC4122)
        .with_version(Version::Random)
        .into_uuid()
}
