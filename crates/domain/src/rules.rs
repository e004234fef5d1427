//! Keyword rule tables for tag and category derivation
//!
//! Both tables are ordered. Matching is a case-insensitive substring test on a
//! folded copy of the text (see [`fold_case`]). For categories the first rule
//! with any matching keyword wins, so table order is the tie-break.

/// Keyword that contributes a set of related tags when present in a post
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    pub keyword: &'static str,
    pub tags: &'static [&'static str],
}

/// Category assigned when any of its keywords is present in a post
#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub category: &'static str,
    pub keywords: &'static [&'static str],
}

/// Category used when no rule matches
pub const DEFAULT_CATEGORY: &str = "Genel";

pub const TAG_RULES: &[KeywordRule] = &[
    KeywordRule {
        keyword: "istanbul",
        tags: &["İstanbul", "Şehir"],
    },
    KeywordRule {
        keyword: "ulaşım",
        tags: &["Ulaşım", "Toplu Taşıma"],
    },
    KeywordRule {
        keyword: "metro",
        tags: &["Metro", "Ulaşım"],
    },
    KeywordRule {
        keyword: "çevre",
        tags: &["Çevre", "Sürdürülebilirlik"],
    },
    KeywordRule {
        keyword: "iklim",
        tags: &["İklim", "Çevre"],
    },
    KeywordRule {
        keyword: "park",
        tags: &["Yeşil Alan", "Park"],
    },
    KeywordRule {
        keyword: "eğitim",
        tags: &["Eğitim"],
    },
    KeywordRule {
        keyword: "kültür",
        tags: &["Kültür", "Sanat"],
    },
    KeywordRule {
        keyword: "spor",
        tags: &["Spor"],
    },
    KeywordRule {
        keyword: "belediye",
        tags: &["Belediye", "Yerel Yönetim"],
    },
    KeywordRule {
        keyword: "sosyal",
        tags: &["Sosyal Destek"],
    },
    KeywordRule {
        keyword: "ekonomi",
        tags: &["Ekonomi"],
    },
    KeywordRule {
        keyword: "deprem",
        tags: &["Deprem", "Afet Hazırlığı"],
    },
    KeywordRule {
        keyword: "konut",
        tags: &["Konut", "Kentsel Dönüşüm"],
    },
];

pub const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: "Ulaşım",
        keywords: &[
            "ulaşım", "metro", "otobüs", "tramvay", "marmaray", "vapur", "trafik",
        ],
    },
    CategoryRule {
        category: "Çevre",
        keywords: &["çevre", "iklim", "yeşil", "park", "geri dönüşüm", "sıfır atık"],
    },
    CategoryRule {
        category: "Eğitim",
        keywords: &["eğitim", "okul", "öğrenci", "üniversite", "burs"],
    },
    CategoryRule {
        category: "Kültür & Sanat",
        keywords: &["kültür", "sanat", "festival", "konser", "müze", "tiyatro"],
    },
    CategoryRule {
        category: "Sosyal Destek",
        keywords: &["sosyal", "yardım", "destek", "kreş", "aile"],
    },
    CategoryRule {
        category: "Afet & Deprem",
        keywords: &["deprem", "afet", "kentsel dönüşüm"],
    },
    CategoryRule {
        category: "Spor",
        keywords: &["spor", "maç", "stadyum"],
    },
    CategoryRule {
        category: "Ekonomi",
        keywords: &["ekonomi", "bütçe", "yatırım", "istihdam"],
    },
    CategoryRule {
        category: "Yönetim",
        keywords: &["belediye", "meclis", "toplantı"],
    },
];

/// Case-fold text for keyword matching.
///
/// Plain `to_lowercase` turns `İ` into `i` + U+0307, which breaks substring
/// matches like `İstanbul` / `istanbul`. All four Turkish i-forms fold to `i`.
pub fn fold_case(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            'İ' | 'I' | 'ı' => folded.push('i'),
            other => folded.extend(other.to_lowercase()),
        }
    }
    folded
}

/// Tags contributed by every rule whose keyword occurs in `text`, in table order
pub fn matching_tags(rules: &[KeywordRule], text: &str) -> Vec<&'static str> {
    let folded = fold_case(text);
    rules
        .iter()
        .filter(|rule| folded.contains(&fold_case(rule.keyword)))
        .flat_map(|rule| rule.tags.iter().copied())
        .collect()
}

/// First category whose keyword list matches `text`
pub fn first_matching_category(rules: &[CategoryRule], text: &str) -> Option<&'static str> {
    let folded = fold_case(text);
    rules
        .iter()
        .find(|rule| {
            rule.keywords
                .iter()
                .any(|keyword| folded.contains(&fold_case(keyword)))
        })
        .map(|rule| rule.category)
}
