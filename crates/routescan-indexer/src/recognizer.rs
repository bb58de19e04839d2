//! Route decorator recognizer.
//!
//! A shallow lexical recognizer for decorator lines of the form
//! `@router.get("/items")` or `@app.api_route("/items", methods=["POST"])`.
//! It is deliberately not a parser: single physical lines in, a match or
//! nothing out, no I/O, no AST. Inputs that fall outside the conventional
//! single-line decorator shape are silent non-matches, never errors.

/// HTTP verbs recognized as decorator call names, lowercase.
pub const ROUTE_VERBS: [&str; 7] = ["get", "post", "put", "delete", "patch", "head", "options"];

/// The multi-verb call name (`api_route(..., methods=[...])`).
pub const GENERIC_CALL: &str = "api_route";

/// How many lines after a decorator are searched for the handler definition.
pub const HANDLER_LOOKAHEAD: usize = 10;

/// Fallback handler name when no definition is found within the lookahead.
pub const UNKNOWN_HANDLER: &str = "unknown";

/// A recognized route declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// HTTP verb, normalized lowercase
    pub method: String,
    /// Route path literal exactly as written in source
    pub path: String,
    /// Name of the handler function following the decorator
    pub handler_name: String,
    /// Identifier before the first `.` (the router/app variable)
    pub declaring_name: String,
}

/// Examine one line plus a bounded lookahead window of following lines.
///
/// Returns a match when the line is a decorator whose call name is a
/// recognized verb (or the generic multi-verb call) and whose first argument
/// is a string literal. Everything else is a non-match.
pub fn recognize(line: &str, lookahead: &[&str]) -> Option<RouteMatch> {
    // Cheap pre-filter before any splitting.
    let trimmed = line.trim();
    let rest = trimmed.strip_prefix('@')?;

    let (declaring_name, call_expr) = rest.split_once('.')?;
    let (call_name, arg_text) = call_expr.split_once('(')?;

    let call = call_name.trim().to_ascii_lowercase();
    let is_verb = ROUTE_VERBS.contains(&call.as_str());
    if !is_verb && call != GENERIC_CALL {
        return None;
    }

    let path = first_string_literal(arg_text)?;

    let method = if is_verb {
        call
    } else {
        match methods_list_verb(arg_text) {
            Some(verb) => {
                // Resolved verbs get no second default: an unrecognized
                // verb in the methods list rejects the line.
                if !ROUTE_VERBS.contains(&verb.as_str()) {
                    return None;
                }
                verb
            }
            None => "get".to_string(),
        }
    };

    Some(RouteMatch {
        method,
        path: path.to_string(),
        handler_name: handler_name(lookahead),
        declaring_name: declaring_name.trim().to_string(),
    })
}

/// Extract the first string literal from argument text.
///
/// Whichever quote character appears first wins; the literal runs to the
/// next occurrence of that same character. No escape handling; an
/// unterminated literal is a non-match.
fn first_string_literal(text: &str) -> Option<&str> {
    let open = text.find(['\'', '"'])?;
    let quote = text.as_bytes()[open] as char;
    let body = &text[open + 1..];
    let close = body.find(quote)?;
    Some(&body[..close])
}

/// Find a `methods = [ "..." ]` sub-expression and return its first listed
/// verb, lowercase. `None` when no such sub-expression exists.
fn methods_list_verb(arg_text: &str) -> Option<String> {
    let lower = arg_text.to_ascii_lowercase();

    // The keyword can also appear inside the path literal; keep scanning
    // until an occurrence with the `= [` shape is found.
    for (kw, _) in lower.match_indices("methods") {
        let after = &arg_text[kw + "methods".len()..];

        // Only `=` and whitespace may sit between the keyword and the list.
        let Some(bracket) = after.find('[') else {
            continue;
        };
        if !after[..bracket].chars().all(|c| c == '=' || c.is_whitespace()) {
            continue;
        }

        return first_string_literal(&after[bracket + 1..]).map(|v| v.to_ascii_lowercase());
    }

    None
}

/// Scan the lookahead window for the first function definition and return
/// the identifier after the `def` keyword.
fn handler_name(lookahead: &[&str]) -> String {
    for line in lookahead.iter().take(HANDLER_LOOKAHEAD) {
        let trimmed = line.trim();
        let rest = trimmed
            .strip_prefix("async ")
            .map(str::trim_start)
            .unwrap_or(trimmed);
        if let Some(after_def) = rest.strip_prefix("def ") {
            let name: String = after_def
                .trim_start()
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_')
                .collect();
            if !name.is_empty() {
                return name;
            }
        }
    }
    UNKNOWN_HANDLER.to_string()
}
