//! Map request URLs to a rate limiting scope.
//!
//! A scope is identified by the [`PlatformId`] taken from the host
//! (`{platform}.api.riotgames.com`) and the [`EndpointMethod`] whose path
//! template matches the URL path.
//!
//! Overlapping templates are resolved purely by catalog order, see
//! the catalog documentation for the known ambiguities.

mod catalog;
mod template;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::{Serialize, Serializer};
use url::Url;

use crate::{ErrorKind, PlatformId, Result};
use template::PathTemplate;

/// Characters escaped when a parameter value is inserted into a path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

static HOST_TEMPLATE: LazyLock<PathTemplate> = LazyLock::new(|| PathTemplate::new(catalog::HOST));

static ROUTES: LazyLock<Vec<Route>> = LazyLock::new(|| {
    catalog::METHODS
        .iter()
        .flat_map(|&(service, operations)| {
            operations.iter().map(move |&(operation, path)| Route {
                method: EndpointMethod { service, operation },
                template: PathTemplate::new(path),
            })
        })
        .collect()
});

#[derive(Debug)]
struct Route {
    method: EndpointMethod,
    template: PathTemplate,
}

/// A cataloged endpoint, displayed as `SERVICE.OPERATION`
/// (e.g. `MATCH_V5.GET_MATCH_BY_ID`).
///
/// Every endpoint method has its own method-tier rate limit per platform.
///
/// # Examples
///
/// ```
/// use riot_ratelimiter_lib::{EndpointMethod, PlatformId};
///
/// let method: EndpointMethod = "MATCH_V5.GET_MATCH_BY_ID".parse().unwrap();
/// let url = method.url(PlatformId::Europe, &[("matchId", "EUW1_6543210")]).unwrap();
/// assert_eq!(
///     url.as_str(),
///     "https://europe.api.riotgames.com/lol/match/v5/matches/EUW1_6543210"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EndpointMethod {
    service: &'static str,
    operation: &'static str,
}

impl EndpointMethod {
    /// The service group, e.g. `MATCH_V5`
    #[must_use]
    pub const fn service(&self) -> &'static str {
        self.service
    }

    /// The operation within the service, e.g. `GET_MATCH_BY_ID`
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        self.operation
    }

    /// All cataloged endpoint methods in catalog order
    pub fn all() -> impl Iterator<Item = Self> {
        ROUTES.iter().map(|route| route.method)
    }

    /// The path template of this endpoint method
    #[must_use]
    pub fn template(&self) -> &'static str {
        self.route().template.as_str()
    }

    /// Names of the path parameters, in order of appearance
    #[must_use]
    pub fn params(&self) -> &'static [&'static str] {
        self.route().template.params()
    }

    /// Build the request URL for this endpoint on the given platform.
    ///
    /// Parameter values are percent-encoded.
    ///
    /// # Errors
    ///
    /// Returns an error if a parameter of the template is not supplied.
    pub fn url(&self, region: PlatformId, params: &[(&str, &str)]) -> Result<Url> {
        let encoded: Vec<(&str, String)> = params
            .iter()
            .map(|(name, value)| (*name, utf8_percent_encode(value, PATH_SEGMENT).to_string()))
            .collect();
        let values: HashMap<&str, &str> = encoded
            .iter()
            .map(|(name, value)| (*name, value.as_str()))
            .collect();

        let path = self.route().template.render(&values)?;
        let url = format!("https://{}{path}", region.host());
        Url::parse(&url).map_err(|e| ErrorKind::ParseUrl(url, e))
    }

    fn route(&self) -> &'static Route {
        // An `EndpointMethod` can only be obtained from the catalog
        ROUTES
            .iter()
            .find(|route| route.method == *self)
            .unwrap_or_else(|| unreachable!("{self} is not cataloged"))
    }
}

impl fmt::Display for EndpointMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.service, self.operation)
    }
}

impl FromStr for EndpointMethod {
    type Err = ErrorKind;

    fn from_str(s: &str) -> Result<Self> {
        let (service, operation) = s
            .split_once('.')
            .ok_or_else(|| ErrorKind::UnknownMethod(s.to_string()))?;
        ROUTES
            .iter()
            .map(|route| route.method)
            .find(|method| method.service == service && method.operation == operation)
            .ok_or_else(|| ErrorKind::UnknownMethod(s.to_string()))
    }
}

impl Serialize for EndpointMethod {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Extract the platform from the host of the URL.
///
/// Returns `None` if the host does not follow `{platform}.api.riotgames.com`
/// or if the platform is not a known [`PlatformId`].
#[must_use]
pub fn extract_region(url: &Url) -> Option<PlatformId> {
    let host = url.host_str()?;
    let captures = HOST_TEMPLATE.captures(host)?;
    captures.get("platformId")?.parse().ok()
}

/// Extract the endpoint method from the path of the URL.
///
/// The catalog is searched in declaration order and the first match wins.
#[must_use]
pub fn extract_method(url: &Url) -> Option<EndpointMethod> {
    let path = url.path();
    ROUTES
        .iter()
        .find(|route| route.template.is_match(path))
        .map(|route| route.method)
}

/// Resolve both parts of the scope of a URL.
///
/// # Errors
///
/// Returns [`ErrorKind::RouteResolution`] naming both attempted values if
/// either of them cannot be resolved.
pub fn resolve(url: &Url) -> Result<(PlatformId, EndpointMethod)> {
    let region = extract_region(url);
    let method = extract_method(url);
    match (region, method) {
        (Some(region), Some(method)) => Ok((region, method)),
        _ => Err(ErrorKind::RouteResolution {
            url: url.clone(),
            region: region.map(|r| r.to_string()),
            method: method.map(|m| m.to_string()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use strum::IntoEnumIterator;
    use url::Url;

    use super::{EndpointMethod, extract_method, extract_region, resolve};
    use crate::{ErrorKind, PlatformId};

    fn url(input: &str) -> Url {
        Url::parse(input).unwrap()
    }

    #[test]
    fn test_catalog_size() {
        let methods: Vec<_> = EndpointMethod::all().collect();
        assert_eq!(methods.len(), 92);

        let services: HashSet<_> = methods.iter().map(EndpointMethod::service).collect();
        assert_eq!(services.len(), 26);
    }

    #[test]
    fn test_extract_region_for_every_platform() {
        for platform in PlatformId::iter() {
            let url = url(&format!("https://{}/lol/status/v4/platform-data", platform.host()));
            assert_eq!(extract_region(&url), Some(platform));
        }
    }

    #[rstest]
    #[case("https://pbe1.api.riotgames.com/lol/platform/v3/champion-rotations")]
    #[case("https://eune1.api.riotgames.com/lol/platform/v3/champion-rotations")]
    #[case("https://api.riotgames.com/lol/platform/v3/champion-rotations")]
    #[case("https://euw1.api.example.com/lol/platform/v3/champion-rotations")]
    #[case("https://euw1.na1.api.riotgames.com/lol/platform/v3/champion-rotations")]
    #[case("https://example.com/lol/platform/v3/champion-rotations")]
    #[case("file:///lol/platform/v3/champion-rotations")]
    fn test_extract_region_rejects_unknown_hosts(#[case] input: &str) {
        assert_eq!(extract_region(&url(input)), None);
    }

    #[test]
    fn test_extract_region_is_case_insensitive() {
        let url = url("https://EUW1.API.RIOTGAMES.COM/lol/platform/v3/champion-rotations");
        assert_eq!(extract_region(&url), Some(PlatformId::Euw1));
    }

    #[test]
    fn test_every_cataloged_method_is_extracted_from_its_url() {
        let methods: Vec<_> = EndpointMethod::all().collect();
        for (index, method) in methods.iter().enumerate() {
            let params: Vec<(&str, &str)> = method
                .params()
                .iter()
                .map(|name| (*name, "param-value_1"))
                .collect();
            let url = method.url(PlatformId::Na1, &params).unwrap();

            // Identical templates always resolve to the first declaration
            let expected = methods[..index]
                .iter()
                .find(|earlier| earlier.template() == method.template())
                .unwrap_or(method);
            assert_eq!(extract_method(&url).as_ref(), Some(expected), "{url}");
        }
    }

    #[rstest]
    #[case(
        "https://euw1.api.riotgames.com/lol/summoner/v4/summoners/by-puuid/abc",
        "SUMMONER.GET_BY_PUUID"
    )]
    #[case(
        "https://euw1.api.riotgames.com/lol/summoner/v4/summoners/me",
        "SUMMONER.GET_BY_ACCESS_TOKEN"
    )]
    #[case(
        "https://euw1.api.riotgames.com/lol/league/v4/entries/by-summoner/abc",
        "LEAGUE.GET_ENTRIES_BY_SUMMONER"
    )]
    #[case(
        "https://euw1.api.riotgames.com/lol/league/v4/entries/RANKED_SOLO_5x5/DIAMOND/I?page=2",
        "LEAGUE.GET_ALL_ENTRIES"
    )]
    #[case(
        "https://europe.api.riotgames.com/lol/match/v5/matches/EUW1_1/timeline",
        "MATCH_V5.GET_MATCH_TIMELINE_BY_ID"
    )]
    #[case(
        "https://europe.api.riotgames.com/lol/match/v5/matches/by-puuid/abc/ids?count=100",
        "MATCH_V5.GET_IDS_BY_PUUID"
    )]
    #[case(
        "https://americas.api.riotgames.com/lol/tournament/v5/codes/CODE-1",
        "TOURNAMENT_V5.GET_TOURNAMENT_BY_CODE"
    )]
    #[case(
        "https://americas.api.riotgames.com/lor/deck/v1/decks/me",
        "LOR_DECK.GET_DECKS_FOR_PLAYER"
    )]
    fn test_extract_method(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(
            extract_method(&url(input)).map(|m| m.to_string()).as_deref(),
            Some(expected)
        );
    }

    #[rstest]
    #[case("https://euw1.api.riotgames.com/")]
    #[case("https://euw1.api.riotgames.com/lol/unknown/v1/thing")]
    #[case("https://euw1.api.riotgames.com/lol/summoner/v4/summoners/by-puuid/a/b")]
    fn test_extract_method_rejects_unknown_paths(#[case] input: &str) {
        assert_eq!(extract_method(&url(input)), None);
    }

    #[test]
    fn test_resolve() {
        let (region, method) =
            resolve(&url("https://kr.api.riotgames.com/lol/platform/v3/champion-rotations"))
                .unwrap();
        assert_eq!(region, PlatformId::Kr);
        assert_eq!(method.to_string(), "CHAMPION.GET_CHAMPION_ROTATIONS");

        let err = resolve(&url("https://example.com/foo")).unwrap_err();
        assert!(matches!(
            err,
            ErrorKind::RouteResolution {
                region: None,
                method: None,
                ..
            }
        ));

        let err = resolve(&url("https://example.com/lol/platform/v3/champion-rotations"))
            .unwrap_err();
        assert!(matches!(
            err,
            ErrorKind::RouteResolution {
                region: None,
                method: Some(ref method),
                ..
            } if method == "CHAMPION.GET_CHAMPION_ROTATIONS"
        ));
    }

    #[test]
    fn test_method_from_str() {
        let method: EndpointMethod = "ACCOUNT.GET_BY_RIOT_ID".parse().unwrap();
        assert_eq!(method.service(), "ACCOUNT");
        assert_eq!(method.operation(), "GET_BY_RIOT_ID");
        assert_eq!(
            method.template(),
            "/riot/account/v1/accounts/by-riot-id/:gameName/:tagLine"
        );

        assert!("ACCOUNT".parse::<EndpointMethod>().is_err());
        assert!("ACCOUNT.GET_NOTHING".parse::<EndpointMethod>().is_err());
    }

    #[test]
    fn test_url_escapes_parameters() {
        let method: EndpointMethod = "ACCOUNT.GET_BY_RIOT_ID".parse().unwrap();
        let url = method
            .url(PlatformId::Europe, &[("gameName", "Hide on bush"), ("tagLine", "KR/1")])
            .unwrap();
        assert_eq!(
            url.path(),
            "/riot/account/v1/accounts/by-riot-id/Hide%20on%20bush/KR%2F1"
        );
        assert_eq!(extract_method(&url), Some(method));

        assert!(method.url(PlatformId::Europe, &[("gameName", "x")]).is_err());
    }
}
