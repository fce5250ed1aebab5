use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// A platform or regional routing value of the Riot Games API.
///
/// Every value is its own independently rate-limited shard, addressed via
/// the host `{region}.api.riotgames.com`.
///
/// # Examples
///
/// ```
/// use riot_ratelimiter_lib::PlatformId;
/// use std::str::FromStr;
///
/// assert_eq!(PlatformId::from_str("euw1").unwrap(), PlatformId::Euw1);
/// assert_eq!(PlatformId::Eune1.to_string(), "eun1");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum PlatformId {
    Euw1,
    #[strum(serialize = "eun1")]
    #[serde(rename = "eun1")]
    Eune1,
    Na1,
    La1,
    La2,
    Kr,
    Jp1,
    Br1,
    Oc1,
    Ru,
    Tr1,
    Europe,
    Asia,
    Sea,
    Americas,
    Ap,
    Br,
    Eu,
    Na,
    Latam,
    Ph2,
    Sg2,
    Th2,
    Tw2,
    Vn2,
    Esports,
    Apac,
}

impl PlatformId {
    /// The host name serving this platform
    #[must_use]
    pub fn host(self) -> String {
        format!("{}.api.riotgames.com", self.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;
    use strum::IntoEnumIterator;

    use super::PlatformId;

    #[test]
    fn test_all_platforms_round_trip_through_their_name() {
        assert_eq!(PlatformId::iter().count(), 27);
        for platform in PlatformId::iter() {
            assert_eq!(PlatformId::from_str(platform.as_ref()), Ok(platform));
        }
    }

    #[rstest]
    #[case("eune1")]
    #[case("euw")]
    #[case("")]
    #[case("pbe1")]
    fn test_unknown_platforms_are_rejected(#[case] input: &str) {
        assert!(PlatformId::from_str(input).is_err());
    }

    #[test]
    fn test_host() {
        assert_eq!(PlatformId::Kr.host(), "kr.api.riotgames.com");
        assert_eq!(PlatformId::Eune1.host(), "eun1.api.riotgames.com");
    }
}
