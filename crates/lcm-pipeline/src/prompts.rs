//! Prompt builders for the pipeline's model exchanges

/// System instruction shared by the modernization and explanation calls
pub(crate) const MODERNIZE_SYSTEM: &str =
    "You modernize Python 2 code into idiomatic Python 3 with type hints.";

/// System instruction for the security audit call
pub(crate) const AUDIT_SYSTEM: &str = r#"You are a security auditing assistant integrated into a code modernization service.
Your task is to analyze Python source code, identify security vulnerabilities, bad practices, or compliance risks, then classify them and suggest improvements.

For each issue, include the following fields:
- risk_level: One of "high", "medium", or "low" (lowercase)
- issue_title: A 2-4 word summary of the issue (e.g., "Unvalidated Input", "SQL Injection Risk")
- description: One sentence describing the issue and why it matters
- flagged_code: The exact line(s) or snippet that triggered the issue
- recommended_code: The corrected/secure version of the flagged_code that should replace it
- suggested_fix: A clear recommendation for modern, secure Python 3 code
- compliance_category: Must be exactly one of: "HIPAA", "ISO27001", or "General"

Look for: insecure functions (eval, exec), missing input validation, hardcoded secrets, unsecured file or network access, deprecated libraries, weak exception handling, logging of sensitive data, poor cryptographic practices, SQL injection, command injection, path traversal, insecure random number generation, and missing authentication or authorization checks.
HIPAA-specific: exposure of PHI, logging or storing PHI unencrypted, missing access control or audit logs for health data.
ISO 27001-specific: hardcoded secrets, no traceability or audit logging, missing input validation, weak cryptography, no error handling strategy.

Return ONLY a valid JSON array. Do not include any markdown formatting or additional text.
[
  {
    "risk_level": "high",
    "issue_title": "Hardcoded Password",
    "description": "The script contains a hardcoded password, which poses a serious risk if committed or shared.",
    "flagged_code": "password = 'mysecret123'",
    "recommended_code": "password = os.getenv('PASSWORD')",
    "suggested_fix": "Store the password in an environment variable or a secure secrets manager.",
    "compliance_category": "ISO27001"
  }
]

If no issues are found, return an empty array: []
Focus on real security issues, not style preferences. Be thorough but avoid false positives."#;

/// User prompt asking for the modernized code, code-only response
pub(crate) fn modernization_request(code: &str) -> String {
    format!(
        "Below is Python 3 code translated from Python 2 by a syntactic rewriter. \
         Label all variable types explicitly and add type annotations to all functions and variables. \
         Remove unnecessary comments, whitespace and unused imports. \
         Improve the code to make it idiomatic and robust in Python 3. \
         Respond ONLY with the raw Python code, without any markdown formatting or triple backticks.\n\n{code}"
    )
}

/// User prompt asking for a bullet-point change explanation
pub(crate) fn explanation_request(legacy: &str, modern: &str) -> String {
    format!(
        "Here are two versions of code. The first is the pre-modernization Python and the second is the modernized Python 3 version. \
         Provide a bullet-point list of at most 10 points explaining what changed. \
         Keep every point specific to differences between the two versions.\n\
         Before:\n{legacy}\nAfter:\n{modern}"
    )
}

/// User prompt carrying the code under audit
pub(crate) fn audit_request(code: &str) -> String {
    format!("Analyze this Python code for security issues:\n\n{code}")
}
