//! Decoding of `System.Account` values across runtime upgrades.
//!
//! The layout of the account information changed twice, each time adding a
//! reference counter. The stored value carries no version marker, so the
//! layout is told apart by its length alone.

use super::{Balance, Index, RefCount};
use crate::{Error, Result};
use parity_scale_codec::Decode;

/// Account information, normalized to the providers layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Encode, Decode, Serialize)]
pub struct AccountInfo {
    pub nonce: Index,
    pub consumers: RefCount,
    pub providers: RefCount,
    pub data: AccountData,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Encode, Decode, Serialize)]
pub struct AccountData {
    pub free: Balance,
    pub reserved: Balance,
    pub misc_frozen: Balance,
    pub free_frozen: Balance,
}

/// Layout with consumers, providers and sufficients.
#[derive(Decode)]
struct AccountInfoWithTripleRefCount {
    nonce: Index,
    consumers: RefCount,
    providers: RefCount,
    #[allow(dead_code)]
    sufficients: RefCount,
    data: AccountData,
}

/// Layout with a single reference counter.
#[derive(Decode)]
struct AccountInfoOld {
    nonce: Index,
    refcount: RefCount,
    data: AccountData,
}

impl AccountInfo {
    pub const TRIPLE_REF_COUNT_LEN: usize = 80;
    pub const PROVIDERS_LEN: usize = 76;
    pub const OLD_LEN: usize = 72;

    /// Decode the raw storage value, selecting the layout by its length.
    pub fn from_raw(raw: &[u8]) -> Result<Self> {
        let mut input = raw;

        let info = match raw.len() {
            Self::TRIPLE_REF_COUNT_LEN => {
                let info = AccountInfoWithTripleRefCount::decode(&mut input)?;
                AccountInfo {
                    nonce: info.nonce,
                    consumers: info.consumers,
                    providers: info.providers,
                    data: info.data,
                }
            }
            Self::PROVIDERS_LEN => AccountInfo::decode(&mut input)?,
            Self::OLD_LEN => {
                let info = AccountInfoOld::decode(&mut input)?;
                // The single counter maps onto consumers.
                AccountInfo {
                    nonce: info.nonce,
                    consumers: info.refcount,
                    providers: 0,
                    data: info.data,
                }
            }
            len => return Err(Error::UnrecognizedAccountInfoLength(len)),
        };

        debug!("decoded account info from {} bytes", raw.len());
        Ok(info)
    }
}
