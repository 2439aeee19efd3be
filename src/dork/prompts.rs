//! Prompt text for the generation and classification calls.

use crate::core::types::{Brand, SearchResultRecord};

/// Free hosting and form builders commonly abused for phishing kits.
pub const HOSTING_PLATFORMS: &[&str] = &[
    ".cprapid.com",
    ".topfi.io",
    ".sites.google.com",
    ".gitbook.io",
    "vercel.app",
    "netlify.app",
    ".jimdofree.com",
    ".glitch.me",
    ".000webhostapp.com",
    ".godaddysites.com",
    ".weebly.com",
    ".linea.build",
    ".consensys.net",
    ".waterbridgemedia.ca",
    ".acodemy.io",
    ".appspot.com",
    ".hedron.pro",
    ".ic0.app",
    ".scroll.io",
    ".webador.com",
    ".mypixieset.com",
    ".mystrikingly.com",
    ".amazonaws.com",
    ".aippnet.org",
    ".powerloom.io",
    ".bemular.net",
    ".sitey.me",
    ".inmotionhosting.com",
    ".flazio.com",
    ".teachable.com",
    ".herokuapp.com",
    ".site123.me",
    ".yolasite.com",
    ".sibforms.com",
    ".boxmode.io",
    ".webydo.com",
    ".xindaim.net",
    ".jotform.com",
    ".fillout.com",
    ".zoho.com",
    ".getresponsesite.com",
];

const SCAM_KEYWORDS: &str = "payment, credit card, billing, support, tech support, secure, verified, \
trusted, official, certificate, discount, offer, promo, deal, verify, help, reset, password, account, \
free, coupon, gift card, credit, reward, bonus, clone, login, sign-in, win, enter credentials, \
\"too good to be true\", \"get rich quick\", \"index of /\"";

pub const DORK_SYSTEM_PROMPT: &str = r#"You are an expert in Google dorking for brand protection. Produce advanced search queries that surface phishing, scam and malicious pages impersonating a brand.

Every query combines:
1. Two or three hosting platforms joined with OR
2. The brand name and related keywords
3. Content or title operators (intext, intitle, inurl)
4. An exclusion of the brand's legitimate domain using -site:

Cover: login and account pages, payment forms, personal data collection, promotional scams, malicious downloads, brand impersonation.

Answer with a JSON array only. Each element is an object with:
- "category": the focus area
- "query": the dork query string
- "purpose": one sentence on what it finds

No prose before or after the array."#;

pub fn dork_user_prompt(brand: &Brand) -> String {
    let b = brand.as_str();
    format!(
        r#"Generate Google dork queries that find phishing and scam content targeting {b}.

Step 1. Collect what an impersonator of {b} would reuse: official domains, product and service names, slogans, and lures such as "free offer", "gift card", "login" or "discount".

Step 2. Build dorks from that material with these operators:
- intext, allintext for page content
- intitle, allintitle for titles
- inurl, allinurl for URL paths
- site: to target hosting platforms, filetype: for documents and binaries
- OR / AND to combine terms, and the minus operator to exclude domains

Scam keywords to pair with {b}: {keywords}

Step 3. Include typo-squatting angles: misspellings of {b}, swapped characters, and prefixes or suffixes such as "{b}-login" or "{b}-support".

Hosting platforms to target: {platforms}

Query families to cover for {b}:
1. Authentication: login forms, password reset, account verification
2. Financial: payment forms, card collection, gift card offers
3. Data collection: personal information forms, fake support, credential theft
4. Brand abuse: logo misuse, company impersonation, fake promotions
5. Malicious content: downloads (.exe, .zip, .pdf), phishing kits

Useful fragments:
- (allintext:"password" OR allintext:"login" OR allintext:"sign in")
- (intitle:"discount" OR intitle:"offer" OR allintext:"coupon")
- (allintext:"secure payment" OR intext:"verified" OR intext:"trusted")

Each query must use two or more hosting platforms, mention {b}, and exclude {b}.com.

Example:
(site:.vercel.app OR site:.netlify.app) intext:"{b}" -site:{b}.com

Generate at least 20 queries."#,
        b = b,
        keywords = SCAM_KEYWORDS,
        platforms = HOSTING_PLATFORMS.join(", "),
    )
}

pub const RELEVANCY_SYSTEM_PROMPT: &str = r#"You are a brand relevancy analyst. Decide whether a search result is a potential phishing or scam page targeting the named brand.

Weigh: direct brand mentions, brand-related keywords, suspicious patterns (login pages, payment forms, data collection), domain legitimacy, and context.

Reply with exactly one word: Yes if the result is a potential security concern, No if it is legitimate or unrelated."#;

pub fn relevancy_user_prompt(brand: &Brand, record: &SearchResultRecord) -> String {
    format!(
        "Brand: {brand}\n\nResult to analyze:\nTitle: {title}\nURL: {link}\nDescription: {snippet}\n\n\
Is this result relevant to potential phishing/scam attempts targeting {brand}?",
        brand = brand,
        title = record.title,
        link = record.link,
        snippet = record.snippet,
    )
}
