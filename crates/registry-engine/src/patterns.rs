//! Keyword tables and pattern fragments shared by the segmenter, the
//! extractors and the creditor normalizer

/// Markers of an institutional (non-personal) creditor
pub const INSTITUTION_KEYWORDS: &[&str] = &[
    "은행",
    "주식회사",
    "(주)",
    "㈜",
    "유한회사",
    "회사",
    "캐피탈",
    "보험",
    "협동조합",
    "조합",
    "새마을금고",
    "금고",
    "신협",
    "농협",
    "수협",
    "저축은행",
    "금융",
    "파이낸스",
    "카드",
    "신탁",
    "공사",
    "공단",
    "대부",
    "자산관리",
    "유동화전문",
    "재단",
    "법인",
];

/// Institution keywords that OCR sometimes splits off as a standalone token
/// ("우리 은행"); they are glued back onto the previous token before cleaning
pub const DETACHABLE_SUFFIXES: &[&str] = &["은행", "저축은행", "캐피탈", "금고", "보험", "카드"];

/// Leading words of institution names that read like a personal name once
/// OCR splits them off ("한국 주택금융공사"); they are glued onto the
/// institution token after them
pub const INSTITUTION_PREFIXES: &[&str] = &[
    "한국",
    "대한",
    "케이비",
    "엔에이치",
    "아이비케이",
    "에스씨",
    "에스비아이",
    "오케이",
    "제이티",
    "국민",
    "신한",
    "우리",
    "하나",
    "기업",
    "산업",
    "주택도시",
    "중소기업",
];

/// Field labels that end a party capture in a full-register row
pub const PARTY_STOP_WORDS: &[&str] = &[
    "채무자",
    "피보전권리",
    "청구금액",
    "범위",
    "존속기간",
    "공동담보",
    "금지사항",
];

/// Organisational unit suffixes that make a short token a branch, not a person
pub const BRANCH_SUFFIXES: &[&str] = &["지점", "본점", "지사", "센터", "출장소", "영업부", "본부"];

/// Creditors that usually indicate a sold or distressed loan
pub const DISTRESSED_CREDITOR_KEYWORDS: &[&str] = &[
    "대부",
    "유동화",
    "자산관리",
    "에프앤아이",
    "에이엠씨",
];

/// Column header words of the summary tables
pub const COLUMN_HEADER_WORDS: &[&str] = &[
    "순위번호",
    "등기목적",
    "접수정보",
    "주요등기사항",
    "대상소유자",
    "등기명의인",
    "(주민)등록번호",
    "최종지분",
];

/// Start of an address span trailing a party name
pub const ADDRESS_START: &str = r"(?:서울|부산|대구|인천|광주|대전|울산|세종)(?:특별시|광역시|특별자치시)|경기도|강원(?:특별자치)?도|충청[남북]도|전라[남북]도|전북특별자치도|경상[남북]도|제주특별자치도";

/// Registration date: `2018년3월5일`, `2018년 3월 5일`, `2018.03.05`
pub const DATE: &str =
    r"\d{4}\s*년\s*\d{1,2}\s*월\s*\d{1,2}\s*일|\d{4}\s*[./]\s*\d{1,2}\s*[./]\s*\d{1,2}";

/// Money amount: grouped digits, optionally with 억/만 units
pub const AMOUNT: &str = r"\d(?:[\d,.]*\d)?(?:\s*억(?:\s*\d(?:[\d,.]*\d)?\s*만)?|\s*만)?";

/// Receipt number: `제12345호`
pub const RECEIPT: &str = r"제\s*\d+\s*호";

/// Registration numbers: resident (masked or not) and corporate
pub const REGISTRATION_NUMBER: &str = r"\d{6}\s*-\s*[\d*]{7}|\d{3}-\d{2}-\d{5}";

/// A short personal name as it appears in the owner column
pub const PERSONAL_NAME: &str = r"[가-힣]{2,4}";

/// Hangul syllable block
pub fn is_hangul(c: char) -> bool {
    ('\u{AC00}'..='\u{D7A3}').contains(&c)
}

/// Regex fragment for a phrase that tolerates spaces inserted between its
/// characters (`근 저 당 권 설 정`); spaces in `phrase` are ignored
pub fn spaced(phrase: &str) -> String {
    phrase
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| regex::escape(&c.to_string()))
        .collect::<Vec<_>>()
        .join(r"\s*")
}

pub fn contains_institution_keyword(text: &str) -> bool {
    INSTITUTION_KEYWORDS.iter().any(|kw| text.contains(kw))
}

pub fn contains_distressed_keyword(text: &str) -> bool {
    DISTRESSED_CREDITOR_KEYWORDS.iter().any(|kw| text.contains(kw))
}

/// 2–4 Hangul syllables that cannot be an institution or a branch
pub fn is_personal_name_token(token: &str) -> bool {
    let count = token.chars().count();
    (2..=4).contains(&count)
        && token.chars().all(is_hangul)
        && !contains_institution_keyword(token)
        && !BRANCH_SUFFIXES.iter().any(|suffix| token.ends_with(suffix))
}
