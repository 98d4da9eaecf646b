//! Method signatures derived from the server trait.

use std::collections::BTreeSet;

use stubsync_core::{Declaration, InterfaceMethod, Param};

/// A trait method's signature as a controller method should carry it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    /// `async fn name<G>`: qualifiers through generics, without visibility;
    /// compared and replaced on existing declarations.
    pub head: String,
    /// `(&self, request: alias::Req) -> alias::Resp`; the part compared and
    /// replaced on existing declarations.
    pub tail: String,
    pub result: Option<String>,
}

impl MethodSignature {
    /// Build from the trait method, qualifying contract types with `alias` and
    /// keeping the parameter names of `existing` where it has them.
    pub fn build(
        method: &InterfaceMethod,
        existing: Option<&Declaration>,
        types: &BTreeSet<String>,
        alias: &str,
    ) -> Self {
        let borrowed: Vec<&str> = existing
            .map(|d| {
                d.params
                    .iter()
                    .filter_map(|p| match p {
                        Param::Named { pattern, .. } => Some(pattern.as_str()),
                        Param::Receiver(_) => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let mut named = 0;
        let params: Vec<String> = method
            .params
            .iter()
            .map(|p| match p {
                Param::Receiver(text) => text.clone(),
                Param::Named { pattern, ty } => {
                    let pattern = borrowed.get(named).copied().unwrap_or(pattern.as_str());
                    named += 1;
                    format!("{pattern}: {}", qualify(ty, types, alias))
                }
            })
            .collect();

        let result = method.result.as_deref().map(|r| qualify(r, types, alias));
        let tail = match &result {
            Some(r) => format!("({}) -> {r}", params.join(", ")),
            None => format!("({})", params.join(", ")),
        };
        let head = format!(
            "{}fn {}{}",
            if method.is_async { "async " } else { "" },
            method.name,
            method
                .generics
                .as_deref()
                .map(|g| qualify(g, types, alias))
                .unwrap_or_default()
        );

        MethodSignature { head, tail, result }
    }

    /// Everything before the body's opening brace of a new method.
    pub fn full(&self) -> String {
        format!("pub {}{}", self.head, self.tail)
    }

    /// Zero-value body for the return type; `None` for unit.
    pub fn zero_body(&self) -> Option<String> {
        let result = self.result.as_deref().map(str::trim)?;
        if result == "()" {
            return None;
        }
        let outer = result.split('<').next().unwrap_or(result).trim();
        let last = outer.rsplit("::").next().unwrap_or(outer);
        if last == "Result" {
            Some("Ok(Default::default())".to_string())
        } else {
            Some("Default::default()".to_string())
        }
    }
}

/// Prefix every identifier in `types` with `alias::`, unless it is already a
/// path segment or a lifetime.
pub fn qualify(ty: &str, types: &BTreeSet<String>, alias: &str) -> String {
    let mut out = String::with_capacity(ty.len() + 16);
    let bytes = ty.as_bytes();
    let mut i = 0;
    while i < ty.len() {
        let c = bytes[i];
        if c == b'_' || c.is_ascii_alphabetic() {
            let start = i;
            while i < ty.len() && (bytes[i] == b'_' || bytes[i].is_ascii_alphanumeric()) {
                i += 1;
            }
            let ident = &ty[start..i];
            let after_path = ty[..start].ends_with("::");
            let before_path = ty[i..].starts_with("::");
            let lifetime = ty[..start].ends_with('\'');
            if types.contains(ident) && !after_path && !before_path && !lifetime {
                out.push_str(alias);
                out.push_str("::");
            }
            out.push_str(ident);
        } else {
            let ch = ty[i..].chars().next().unwrap_or(' ');
            out.push(ch);
            i += ch.len_utf8();
        }
    }
    out
}

/// Whitespace- and trailing-comma-insensitive form used to compare signatures.
pub fn canonical(sig: &str) -> String {
    let compact: Vec<char> = sig.chars().filter(|c| !c.is_whitespace()).collect();
    let mut out = String::with_capacity(compact.len());
    for (i, &c) in compact.iter().enumerate() {
        if c == ',' && matches!(compact.get(i + 1), Some(')') | Some('>') | Some(']')) {
            continue;
        }
        out.push(c);
    }
    out
}
