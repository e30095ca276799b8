//! Test fixtures for marketplace tests.

use crate::{Address, NewListing};

/// Common test data.
pub struct TestFixtures;

impl TestFixtures {
    /// The account the mocks send transactions from.
    pub fn signer() -> Address {
        Address::new(super::TEST_SIGNER)
    }

    /// A provider address distinct from the signer.
    pub fn provider() -> Address {
        Address::new("0x00000000000000000000000000000000000000aa")
    }

    /// A sample `createListing` request.
    ///
    /// `index` cycles through a handful of machines.
    pub fn new_listing(index: usize) -> NewListing {
        const MACHINES: [(&str, u128, &str); 3] = [
            ("RTX 3080 Render Node", 200_000_000_000_000, "QmFixture0"),
            ("A100 Training Box", 1_000_000_000_000_000, "QmFixture1"),
            ("Ryzen 7950X Build Server", 50_000_000_000_000, "QmFixture2"),
        ];
        let (title, rate, cid) = MACHINES[index % MACHINES.len()];
        NewListing::new("fDAIx", rate, title, cid)
    }
}

/// Deterministic 20-byte hex address derived from `seed`.
pub fn test_address(seed: u8) -> Address {
    Address::new(alloy_primitives::hex::encode_prefixed([seed; 20]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_addresses() {
        assert_eq!(test_address(0xab).as_str().len(), 42);
        assert!(!TestFixtures::signer().matches(&TestFixtures::provider()));
    }

    #[test]
    fn test_new_listing_cycles() {
        assert_eq!(TestFixtures::new_listing(0), TestFixtures::new_listing(3));
        assert_ne!(TestFixtures::new_listing(0).title, TestFixtures::new_listing(1).title);
    }
}
