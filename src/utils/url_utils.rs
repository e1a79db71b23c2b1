// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::Url;

/// 宽松解析URL
///
/// 搜索结果中的链接可能缺少协议头（如 `facebook.com/Page/`），此时补全为https后再解析
pub fn parse_lenient(raw: &str) -> Option<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Url::parse(trimmed).ok().filter(|u| u.has_host()).or_else(|| {
        let without_slashes = trimmed.trim_start_matches("//");
        Url::parse(&format!("https://{}", without_slashes))
            .ok()
            .filter(|u| u.has_host())
    })
}

/// 非空路径段
pub fn path_segments(url: &Url) -> Vec<String> {
    url.path_segments()
        .map(|segments| {
            segments
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// 查询参数值
pub fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.into_owned())
}
