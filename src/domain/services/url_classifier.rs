// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::models::search_hit::SearchHit;
use crate::domain::models::verdict::ClassificationVerdict;
use crate::utils::url_utils::{parse_lenient, path_segments, query_param};

/// URL分类器
///
/// 根据商户身份和候选列表给出最佳URL的结论。实现不会通过错误通道
/// 返回失败，所有问题都体现在结论的 `kind` 与说明中。
#[async_trait]
pub trait UrlClassifier: Send + Sync {
    async fn classify(
        &self,
        business_name: &str,
        location: &str,
        candidates: &[SearchHit],
    ) -> ClassificationVerdict;

    /// 分类策略名称
    fn name(&self) -> &'static str;
}

/// 群组路径标识
pub const GROUP_SEGMENT: &str = "groups";

/// 主页之后的子栏目，不能作为选择目标
pub const SUBPAGE_SECTIONS: &[&str] = &[
    "about",
    "posts",
    "mentions",
    "reviews",
    "photos",
    "media",
    "reel",
    "reels",
    "videos",
    "events",
    "live_videos",
    "followers",
    "following",
    "friends",
    "music",
    "map",
    "sports",
    "movies",
    "tv",
    "books",
    "likes",
    "reviews_given",
    "community",
    "services",
    "shop",
];

/// 平台保留的顶级路径，不对应任何商户主页
pub const RESERVED_PATHS: &[&str] = &[
    "watch",
    "marketplace",
    "login",
    "login.php",
    "sharer",
    "sharer.php",
    "share",
    "hashtag",
    "search",
    "events",
    "photo.php",
    "photo",
    "story.php",
    "permalink.php",
    "reel",
    "help",
    "policies",
];

/// 个人主页路径：小写单词以点或连字符连接，可带数字后缀（如 `john.smith.123`）
static PERSONAL_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]+(?:[.\-][a-z]+)+(?:[.\-]?\d+)?$").unwrap());

/// 新版主页路径末尾的数字ID（如 `Tennis-Club-Le-Colline-61566371468729`）
static TRAILING_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-_.]?\d{6,}$").unwrap());

/// URL路径形态
#[derive(Debug, Clone, PartialEq)]
pub enum UrlShape {
    /// 群组
    Group,
    /// 带数字ID的个人主页，或 `/people/` 路径
    Profile,
    /// 主页，`slug` 用于名称匹配，`vanity` 表示是否为单段自定义路径
    Page { slug: String, vanity: bool },
    /// 主页下的子栏目
    SubPage { parent: String, slug: String, section: String },
    /// 平台保留路径
    Reserved(String),
    /// 没有路径或无法解析
    Unrecognized,
}

/// 分析URL的路径形态
pub fn analyze_url(raw: &str) -> UrlShape {
    let Some(url) = parse_lenient(raw) else {
        return UrlShape::Unrecognized;
    };
    let segments = path_segments(&url);

    // Group indicator wins regardless of any other pattern.
    if segments
        .iter()
        .any(|s| s.eq_ignore_ascii_case(GROUP_SEGMENT))
    {
        return UrlShape::Group;
    }

    let Some(first) = segments.first() else {
        return UrlShape::Unrecognized;
    };
    let first_lower = first.to_lowercase();

    if first_lower == "profile.php" {
        return match query_param(&url, "id") {
            Some(id) if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) => {
                UrlShape::Profile
            }
            _ => UrlShape::Reserved(first_lower),
        };
    }
    if first_lower == "people" {
        return UrlShape::Profile;
    }
    if RESERVED_PATHS.contains(&first_lower.as_str()) {
        return UrlShape::Reserved(first_lower);
    }

    let (main_len, slug, vanity) = match first_lower.as_str() {
        "p" | "pg" => match segments.get(1) {
            Some(slug) => (2, strip_trailing_id(slug), false),
            None => return UrlShape::Unrecognized,
        },
        "pages" => match segments.get(1) {
            Some(slug) => (segments.len().min(3), slug.clone(), false),
            None => return UrlShape::Unrecognized,
        },
        _ => (1, first.clone(), true),
    };

    if let Some(section) = segments.get(main_len) {
        let section = section.to_lowercase();
        if SUBPAGE_SECTIONS.contains(&section.as_str()) {
            let parent = format!(
                "{}://{}/{}/",
                url.scheme(),
                url.host_str().unwrap_or_default(),
                segments[..main_len].join("/")
            );
            return UrlShape::SubPage {
                parent,
                slug,
                section,
            };
        }
    }

    UrlShape::Page { slug, vanity }
}

/// 是否为群组URL
pub fn is_group_url(raw: &str) -> bool {
    analyze_url(raw) == UrlShape::Group
}

/// 自定义路径是否像个人姓名
pub fn looks_like_personal_name(slug: &str) -> bool {
    PERSONAL_NAME_RE.is_match(slug)
}

fn strip_trailing_id(slug: &str) -> String {
    let stripped = TRAILING_ID_RE.replace(slug, "").to_string();
    if stripped.is_empty() {
        slug.to_string()
    } else {
        stripped
    }
}
