use portal_gateway::{
    Category, Decision, NavigationEvent, NavigationType, Outcome, Phase, Role, StaticTiming,
    is_page_reload,
};
use serde_json::json;

#[test]
fn test_role_ids() {
    assert_eq!(Role::from_role_id(1), Some(Role::Member));
    assert_eq!(Role::from_role_id(2), Some(Role::Admin));
    assert_eq!(Role::from_role_id(0), None);
    assert_eq!(Role::from_role_id(3), None);
    assert_eq!(Role::default(), Role::None);
}

#[test]
fn test_navigation_type_parsing() {
    assert_eq!("reload".parse::<NavigationType>(), Ok(NavigationType::Reload));
    assert_eq!("navigate".parse::<NavigationType>(), Ok(NavigationType::Navigate));
    assert_eq!(
        "back-forward".parse::<NavigationType>(),
        Ok(NavigationType::BackForward)
    );
    assert_eq!(
        "back_forward".parse::<NavigationType>(),
        Ok(NavigationType::BackForward)
    );
    assert!("refresh".parse::<NavigationType>().is_err());
}

#[test]
fn test_reload_detection() {
    assert!(is_page_reload(&StaticTiming::new(NavigationType::Reload)));
    assert!(!is_page_reload(&StaticTiming::new(NavigationType::Navigate)));
    assert!(!is_page_reload(&StaticTiming::new(NavigationType::BackForward)));
    assert!(!is_page_reload(&StaticTiming::new(NavigationType::Prerender)));
    // Missing timing facility never forces a splash.
    assert!(!is_page_reload(&StaticTiming::unavailable()));
}

#[test]
fn test_boot_and_push_events() {
    let boot = NavigationEvent::boot("/documentos", &StaticTiming::new(NavigationType::Reload));
    assert!(boot.is_reload);
    assert_eq!(boot.path, "/documentos");

    let boot = NavigationEvent::boot("/", &StaticTiming::unavailable());
    assert!(!boot.is_reload);

    assert!(!NavigationEvent::push("/perfil").is_reload);
}

#[test]
fn test_decision_serializes_for_the_shell() {
    let decision = Decision {
        phase: Phase::Decided,
        path: "/panel-admin".to_string(),
        category: Category::Admin,
        role: Role::Member,
        checked: true,
        epoch: 4,
        outcome: Outcome::RedirectToLogin,
    };

    assert_eq!(
        serde_json::to_value(&decision).unwrap(),
        json!({
            "phase": "decided",
            "path": "/panel-admin",
            "category": "admin",
            "role": "member",
            "checked": true,
            "epoch": 4,
            "outcome": "redirect_to_login",
        })
    );
    assert_eq!(Outcome::RedirectToLogin.to_string(), "redirect_to_login");
    assert_eq!(serde_json::to_value(Outcome::Pending).unwrap(), json!("pending"));
}
