/// Region used whenever the input is absent or unrecognized
pub const DEFAULT_REGION: &str = "us-east-2";

/// A provider region with its display name and the friendly names that map to it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionInfo {
    pub code: &'static str,
    pub display_name: &'static str,
    pub aliases: &'static [&'static str],
}

/// Static bidirectional region table
pub const REGIONS: &[RegionInfo] = &[
    RegionInfo {
        code: "us-east-1",
        display_name: "N. Virginia",
        aliases: &["virginia", "n. virginia", "north virginia"],
    },
    RegionInfo {
        code: "us-east-2",
        display_name: "Ohio",
        aliases: &["ohio"],
    },
    RegionInfo {
        code: "us-west-1",
        display_name: "N. California",
        aliases: &["california", "n. california", "northern california"],
    },
    RegionInfo {
        code: "us-west-2",
        display_name: "Oregon",
        aliases: &["oregon"],
    },
    RegionInfo {
        code: "eu-west-1",
        display_name: "Ireland",
        aliases: &["ireland"],
    },
    RegionInfo {
        code: "eu-west-2",
        display_name: "London",
        aliases: &["london"],
    },
    RegionInfo {
        code: "eu-west-3",
        display_name: "Paris",
        aliases: &["paris"],
    },
    RegionInfo {
        code: "eu-central-1",
        display_name: "Frankfurt",
        aliases: &["frankfurt"],
    },
    RegionInfo {
        code: "eu-north-1",
        display_name: "Stockholm",
        aliases: &["stockholm"],
    },
    RegionInfo {
        code: "ap-northeast-1",
        display_name: "Tokyo",
        aliases: &["tokyo"],
    },
    RegionInfo {
        code: "ap-northeast-2",
        display_name: "Seoul",
        aliases: &["seoul"],
    },
    RegionInfo {
        code: "ap-northeast-3",
        display_name: "Osaka",
        aliases: &["osaka"],
    },
    RegionInfo {
        code: "ap-southeast-1",
        display_name: "Singapore",
        aliases: &["singapore"],
    },
    RegionInfo {
        code: "ap-southeast-2",
        display_name: "Sydney",
        aliases: &["sydney"],
    },
    RegionInfo {
        code: "ap-south-1",
        display_name: "Mumbai",
        aliases: &["mumbai"],
    },
    RegionInfo {
        code: "ca-central-1",
        display_name: "Canada Central",
        aliases: &["canada", "central"],
    },
    RegionInfo {
        code: "sa-east-1",
        display_name: "São Paulo",
        aliases: &["sao paulo", "são paulo", "brazil"],
    },
];

/// Place names recognised when scanning free text for a region
pub const LOCATION_KEYWORDS: &[&str] = &[
    "virginia",
    "ohio",
    "california",
    "oregon",
    "ireland",
    "london",
    "paris",
    "frankfurt",
    "stockholm",
    "tokyo",
    "seoul",
    "osaka",
    "singapore",
    "sydney",
    "mumbai",
    "canada",
    "brazil",
    "sao paulo",
];

/// Map a friendly location name or region code to a canonical region code
///
/// Total: absent, empty or unrecognized input yields [`DEFAULT_REGION`].
///
/// # Example
/// ```
/// use cloudmesh::domain::region::{map_region, DEFAULT_REGION};
///
/// assert_eq!(map_region(Some("Tokyo")), "ap-northeast-1");
/// assert_eq!(map_region(Some("atlantis")), DEFAULT_REGION);
/// assert_eq!(map_region(None), DEFAULT_REGION);
/// ```
pub fn map_region(input: Option<&str>) -> &'static str {
    let needle = match input.map(|raw| raw.trim().to_lowercase()) {
        Some(needle) if !needle.is_empty() => needle,
        _ => return DEFAULT_REGION,
    };

    REGIONS
        .iter()
        .find(|info| info.code == needle || info.aliases.contains(&needle.as_str()))
        .map(|info| info.code)
        .unwrap_or(DEFAULT_REGION)
}

/// Display name for a region code; unknown codes display as themselves
pub fn display_name(code: &str) -> &str {
    REGIONS
        .iter()
        .find(|info| info.code == code)
        .map(|info| info.display_name)
        .unwrap_or(code)
}
