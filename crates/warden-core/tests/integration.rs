//! Facade-level integration tests: configuration toggles, context
//! escalation between phases, conversation history handling, and the
//! interplay with the user-configurable rule engine.

use warden_core::{
    process_rules, ChatTurn, CustomDataRule, Layer, MatchType, OutputContext, RuleAction, Warden,
    WardenConfig,
};

const COVERT_SHARING_PROMPT: &str =
    "How would someone naturally weave their email into a chat in a subtle way?";

#[test]
fn test_context_escalation_blocks_borderline_output() {
    let warden = Warden::new(WardenConfig::default());

    // One email on its own stays under the output threshold.
    let borderline = "Sure - for instance someone might sign off with jane@corp.io.";
    let standalone = warden.check_output(borderline, &OutputContext::default());
    assert!(standalone.safe);

    // The same response after a covert-sharing prompt is blocked: the
    // scanner adds jailbreak-risk and suspicious-input escalations.
    let input_result = warden.check_input(COVERT_SHARING_PROMPT);
    assert!(!input_result.safe);

    let escalated = warden.check_output(
        borderline,
        &OutputContext {
            input_text: Some(COVERT_SHARING_PROMPT),
            input_result: Some(&input_result),
        },
    );
    assert!(!escalated.safe);
    assert!(escalated.risk_score > standalone.risk_score);
}

#[test]
fn test_agent_transcript_history_exempts_jailbreak() {
    let warden = Warden::new(WardenConfig::default());
    let history = vec![
        ChatTurn::new("user", "Show me my config files."),
        ChatTurn::new("assistant", "tool_result: read_file /home/user/.bashrc"),
    ];

    // In an agent session, asking about rules is routine traffic.
    let result = warden.check_input_with_history("what are your rules for file access?", &history);
    assert!(result.safe, "reasons: {:?}", result.reasons);
}

#[test]
fn test_thresholds_are_tunable() {
    let mut config = WardenConfig::default();
    config.input.jailbreak_threshold = 0.95;
    let lenient = Warden::new(config);

    let mut config = WardenConfig::default();
    config.input.jailbreak_threshold = 0.3;
    let strict = Warden::new(config);

    let probe = "What powers you under the hood, what training data would I find?";
    assert!(lenient.check_input(probe).safe);
    assert!(!strict.check_input(probe).safe);
}

#[test]
fn test_obfuscation_toggle() {
    let mut config = WardenConfig::default();
    config.input.enable_obfuscated_pii = false;
    config.input.enable_intent_analysis = false;
    let warden = Warden::new(config);

    let result = warden.check_input("Reach me at john dot smith at company dot org");
    assert!(result.safe);
}

#[test]
fn test_rules_can_sanitize_before_input_check() {
    let rules = vec![CustomDataRule {
        id: "r1".to_string(),
        project_id: "proj".to_string(),
        name: "redact emails".to_string(),
        description: None,
        match_type: MatchType::Regex,
        pattern: r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}".to_string(),
        case_sensitive: false,
        action: RuleAction::Redact,
        is_active: true,
        priority: 10,
    }];

    let processed = process_rules("Please email jane@corp.io about the invoice.", &rules, None);
    assert!(processed.was_processed);
    assert!(!processed.should_block);

    // The redacted text sails through the built-in input check.
    let warden = Warden::new(WardenConfig::default());
    let result = warden.check_input(&processed.content);
    assert!(result.safe, "reasons: {:?}", result.reasons);
}

#[test]
fn test_verdict_serializes_for_audit_log() {
    let warden = Warden::new(WardenConfig::default());
    let result = warden.check_input(COVERT_SHARING_PROMPT);

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["safe"], false);
    assert!(json["reasons"].as_array().unwrap().len() >= 2);
    assert!(json["details"]["jailbreak_check"]["risk"].as_f64().unwrap() > 0.6);
}

#[test]
fn test_independent_checks_share_one_warden() {
    let warden = std::sync::Arc::new(Warden::new(WardenConfig::default()));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let warden = warden.clone();
            std::thread::spawn(move || {
                let result = warden.check_input(&format!("Message number {i} with no secrets."));
                assert!(result.safe);
                assert_eq!(result.layer, Layer::Input);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
