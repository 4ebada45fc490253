//! Region detection for small-amount deposit priority
//!
//! Maps a property address to the statutory region table of
//! 주택임대차보호법 시행령 제10조/제11조:
//! - Seoul
//! - Overcrowding control areas (과밀억제권역) plus 세종, 용인, 화성, 김포
//! - Metropolitan cities outside those areas, plus 안산, 광주(경기), 파주, 이천, 평택
//! - Everything else

use shared_types::Region;

/// Cities of Gyeonggi-do inside the overcrowding control area, plus the
/// cities the decree adds to that tier
const OVERCROWDING_CITIES: &[&str] = &[
    "의정부시",
    "구리시",
    "남양주시",
    "하남시",
    "고양시",
    "수원시",
    "성남시",
    "안양시",
    "부천시",
    "광명시",
    "과천시",
    "의왕시",
    "군포시",
    "시흥시",
    "용인시",
    "화성시",
    "김포시",
];

/// Gyeonggi-do cities given the metropolitan-city tier
const METRO_TIER_CITIES: &[&str] = &["안산시", "광주시", "파주시", "이천시", "평택시"];

const METROPOLITAN_CITIES: &[&str] = &["부산", "대구", "광주", "대전", "울산"];

/// Incheon districts outside the overcrowding control area
const INCHEON_EXCLUDED: &[&str] = &["강화군", "옹진군"];

/// Detect the deposit-priority region from a property address.
///
/// Unknown or empty addresses fall back to [`Region::Other`], the most
/// conservative tier.
pub fn detect_region(address: &str) -> Region {
    let compact: String = address.chars().filter(|c| !c.is_whitespace()).collect();

    if compact.starts_with("서울") {
        return Region::Seoul;
    }

    if compact.starts_with("세종") {
        return Region::OvercrowdingControl;
    }

    if compact.starts_with("인천") {
        if INCHEON_EXCLUDED.iter().any(|d| compact.contains(d)) {
            return Region::Other;
        }
        return Region::OvercrowdingControl;
    }

    if compact.starts_with("경기") {
        if OVERCROWDING_CITIES.iter().any(|c| compact.contains(c)) {
            return Region::OvercrowdingControl;
        }
        if METRO_TIER_CITIES.iter().any(|c| compact.contains(c)) {
            return Region::MetropolitanCity;
        }
        return Region::Other;
    }

    if let Some(city) = METROPOLITAN_CITIES
        .iter()
        .find(|city| compact.starts_with(*city))
    {
        // County areas (군) of a metropolitan city are not part of the tier
        let rest = compact[city.len()..].trim_start_matches("광역시");
        let district: String = rest.chars().take_while(|c| *c != '군' && *c != '구').collect();
        let is_county = rest[district.len()..].starts_with('군');
        return if is_county {
            Region::Other
        } else {
            Region::MetropolitanCity
        };
    }

    // Gyeonggi cities written without the province prefix
    if OVERCROWDING_CITIES.iter().any(|c| compact.starts_with(c)) {
        return Region::OvercrowdingControl;
    }
    if METRO_TIER_CITIES.iter().any(|c| compact.starts_with(c)) {
        return Region::MetropolitanCity;
    }

    Region::Other
}
