use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use astroai_application::flows::{
    CONNECTION_FAILED, FEATURE_DISABLED, PROFILE_SAVED, READING_FAILED, REVEAL_ALL_CARDS,
};
use astroai_application::navigation_controller::EXIT_HINT;
use astroai_application::{
    ForecastCache, HistoryService, ModelChoice, NavigationController, ProfileService,
    ReadingService, ScreenFlows, Services, SettingsService,
};
use astroai_core::AstroError;
use astroai_core::clock::ManualClock;
use astroai_core::config::{FeatureFlags, Limits};
use astroai_core::error::Result;
use astroai_core::forecast::{FallbackMessages, ForecastOrigin, ForecastSign};
use astroai_core::gateway::{AiGateway, ForecastFetcher, GatewayRequest};
use astroai_core::history::{HistoryEntry, HistoryKind};
use astroai_core::language::Language;
use astroai_core::navigation::{BackOutcome, InMemoryHistory, Navigator, RootExitGuard, ScreenId};
use astroai_core::notification::{RecordingNotifier, ToastKind};
use astroai_core::reading::{
    CONNECTION_DISRUPTED_REPLY, CardMeaning, ChatRole, Hand, PalmReading, TarotCard, TarotCategory,
    TarotReading,
};
use astroai_core::storage::MemoryStore;
use astroai_core::user::{Gender, InitialRoute, ProfileDraft, ZodiacSign};
use async_trait::async_trait;
use chrono::{Local, NaiveDate, TimeZone};

/// Gateway that answers with a fixed reply, or fails, after an optional delay.
struct FakeGateway {
    reply: Option<String>,
    delay: Duration,
    calls: AtomicUsize,
}

impl FakeGateway {
    fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    fn offline() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    fn slow(reply: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            delay,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl AiGateway for FakeGateway {
    async fn complete(&self, _request: GatewayRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.reply
            .clone()
            .ok_or_else(|| AstroError::upstream(None, "network unreachable", true))
    }
}

struct CountingFetcher {
    calls: AtomicUsize,
}

#[async_trait]
impl ForecastFetcher for CountingFetcher {
    async fn fetch(&self, sign: ForecastSign, _language: Language) -> Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(format!("A calm day for {}.", sign.western().name())))
    }
}

struct Harness {
    flows: ScreenFlows,
    store: Arc<MemoryStore>,
    notifier: Arc<RecordingNotifier>,
    clock: Arc<ManualClock>,
    fetcher: Arc<CountingFetcher>,
}

fn harness_with(store: Arc<MemoryStore>, gateway: Arc<FakeGateway>, features: FeatureFlags) -> Harness {
    let limits = Limits::default();
    let clock = Arc::new(ManualClock::new(
        Local.with_ymd_and_hms(2024, 5, 14, 8, 0, 0).unwrap(),
    ));
    let notifier = Arc::new(RecordingNotifier::new());
    let fetcher = Arc::new(CountingFetcher {
        calls: AtomicUsize::new(0),
    });

    let navigator = Navigator::new(
        Box::new(InMemoryHistory::new()),
        RootExitGuard::new(limits.exit_window_ms),
    );
    let controller = Arc::new(NavigationController::new(navigator, notifier.clone(), clock.clone()));
    let services = Services {
        profiles: Arc::new(ProfileService::new(store.clone(), clock.clone())),
        history: Arc::new(HistoryService::new(store.clone(), &limits, true)),
        settings: Arc::new(SettingsService::new(store.clone())),
        forecasts: Arc::new(ForecastCache::new(
            store.clone(),
            fetcher.clone(),
            clock.clone(),
            FallbackMessages::default(),
        )),
        readings: Arc::new(
            ReadingService::new(
                gateway,
                ModelChoice {
                    text: "text-model".into(),
                    vision: "vision-model".into(),
                },
                clock.clone(),
                &limits,
            )
            .unwrap(),
        ),
    };

    Harness {
        flows: ScreenFlows::new(controller, services, features, limits),
        store,
        notifier,
        clock,
        fetcher,
    }
}

fn harness(gateway: Arc<FakeGateway>) -> Harness {
    harness_with(Arc::new(MemoryStore::new()), gateway, FeatureFlags::default())
}

fn asha() -> ProfileDraft {
    ProfileDraft {
        name: "Asha".into(),
        dob: NaiveDate::from_ymd_opt(1995, 7, 10),
        time_of_birth: None,
        gender: Some(Gender::Female),
    }
}

fn deck() -> Vec<TarotCard> {
    ["The Fool", "The Magician", "The High Priestess", "The Empress", "The Star"]
        .iter()
        .enumerate()
        .map(|(i, name)| TarotCard {
            id: format!("major_{i}"),
            name: name.to_string(),
            number: Some(i as u8),
            arcana: "Major".to_string(),
            suit: None,
            keywords: Vec::new(),
            meaning: CardMeaning {
                upright: format!("{name} upright"),
                reversed: format!("{name} reversed"),
            },
        })
        .collect()
}

/// A small skin-toned PNG, as a camera upload would arrive.
fn palm_photo() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(64, 80, image::Rgb([200, 160, 140]));
    let mut buffer = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buffer, image::ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

const PALM_REPLY: &str = r#"{"summary": "A steady, patient hand.", "heartLine": {"type": "Curved", "meaning": "Warmth", "advice": "Speak openly"}}"#;

/// Runs a fresh harness through onboarding so it sits on home.
async fn onboarded(gateway: Arc<FakeGateway>) -> Harness {
    onboarded_in(Arc::new(MemoryStore::new()), gateway).await
}

async fn onboarded_in(store: Arc<MemoryStore>, gateway: Arc<FakeGateway>) -> Harness {
    let h = harness_with(store, gateway, FeatureFlags::default());
    h.flows.start().await;
    h.flows.change_language(Language::En).await;
    h.flows.controller().navigate(ScreenId::ProfileSetup, None);
    h.flows.complete_profile(asha()).await.unwrap();
    h.notifier.clear();
    h
}

#[tokio::test]
async fn new_user_onboards_and_returns_home_on_restart() {
    let store = Arc::new(MemoryStore::new());
    let h = harness_with(store.clone(), FakeGateway::offline(), FeatureFlags::default());
    let controller = h.flows.controller();

    assert_eq!(h.flows.start().await, Some(InitialRoute::LanguageThenOnboarding));
    assert_eq!(controller.current_screen(), ScreenId::Language);
    assert!(controller.history_stack().is_empty());

    h.flows.change_language(Language::Hi).await;
    assert_eq!(controller.current_screen(), ScreenId::Onboarding);
    controller.navigate(ScreenId::ProfileSetup, None);

    let outcome = h.flows.complete_profile(asha()).await.unwrap();
    assert!(outcome.first_save);
    assert_eq!(outcome.profile.zodiac_sign(), Some(ZodiacSign::Cancer));
    assert_eq!(controller.current_screen(), ScreenId::Home);
    assert!(controller.history_stack().is_empty());

    let toasts = h.notifier.toasts();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].message, PROFILE_SAVED);

    let restarted = harness_with(store, FakeGateway::offline(), FeatureFlags::default());
    assert_eq!(restarted.flows.start().await, Some(InitialRoute::Home));
    assert_eq!(restarted.flows.controller().current_screen(), ScreenId::Home);
    assert_eq!(restarted.flows.services().settings.language().await, Language::Hi);
}

#[tokio::test]
async fn invalid_profile_stays_on_form() {
    let h = harness(FakeGateway::offline());
    h.flows.start().await;
    h.flows.change_language(Language::En).await;
    h.flows.controller().navigate(ScreenId::ProfileSetup, None);

    let err = h
        .flows
        .complete_profile(ProfileDraft {
            gender: None,
            ..asha()
        })
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(h.flows.controller().current_screen(), ScreenId::ProfileSetup);
    assert!(h.notifier.toasts().is_empty());
}

#[tokio::test]
async fn editing_profile_goes_back() {
    let h = onboarded(FakeGateway::offline()).await;
    let controller = h.flows.controller();
    controller.navigate(ScreenId::Settings, None);
    controller.navigate(ScreenId::ProfileSetup, None);

    let outcome = h
        .flows
        .complete_profile(ProfileDraft {
            name: "Asha R".into(),
            ..asha()
        })
        .await
        .unwrap();
    assert!(!outcome.first_save);
    assert_eq!(controller.current_screen(), ScreenId::Settings);
    assert_eq!(controller.history_stack(), vec![ScreenId::Home]);
}

#[tokio::test]
async fn tarot_failure_keeps_revealed_cards() {
    let h = onboarded(FakeGateway::offline()).await;
    h.flows.controller().navigate(ScreenId::Tarot, None);

    let spread = h.flows.shuffle_tarot(Some(TarotCategory::Love), &deck()).unwrap();
    assert_eq!(spread.cards.len(), 3);

    assert!(h.flows.request_tarot_reading().await.is_none());
    assert_eq!(h.notifier.toasts()[0].message, REVEAL_ALL_CARDS);
    h.notifier.clear();

    for i in 0..3 {
        assert!(h.flows.reveal_tarot_card(i));
    }
    assert!(!h.flows.reveal_tarot_card(0));

    assert!(h.flows.request_tarot_reading().await.is_none());
    let toasts = h.notifier.toasts();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].kind, ToastKind::Error);
    assert_eq!(toasts[0].message, READING_FAILED);

    assert_eq!(h.flows.controller().current_screen(), ScreenId::Tarot);
    assert!(h.flows.tarot_spread().unwrap().all_revealed());
    let history: Vec<HistoryEntry<TarotReading>> =
        h.flows.services().history.list(HistoryKind::Tarot).await;
    assert!(history.is_empty());
}

#[tokio::test]
async fn tarot_success_is_recorded() {
    let h = onboarded(FakeGateway::replying(
        r#"Here you go: {"reading": "A new chapter opens.", "affirmation": "I am ready."}"#,
    ))
    .await;
    h.flows.controller().navigate(ScreenId::Tarot, None);
    h.flows.shuffle_tarot(Some(TarotCategory::Career), &deck());
    for i in 0..3 {
        h.flows.reveal_tarot_card(i);
    }

    let reading = h.flows.request_tarot_reading().await.unwrap();
    assert_eq!(reading.interpretation.reading, "A new chapter opens.");
    assert_eq!(h.flows.controller().current_screen(), ScreenId::TarotReading);
    assert!(h.flows.tarot_spread().is_none());

    let params = h.flows.controller().params().unwrap();
    assert_eq!(params["category"], "career");

    let history: Vec<HistoryEntry<TarotReading>> =
        h.flows.services().history.list(HistoryKind::Tarot).await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].record, reading);
}

#[tokio::test]
async fn daily_forecast_is_fetched_once_per_day() {
    let h = onboarded(FakeGateway::offline()).await;
    let controller = h.flows.controller();
    controller.navigate(ScreenId::Rashifal, None);

    let first = h.flows.open_daily_forecast(ZodiacSign::Leo.into()).await.unwrap();
    assert_eq!(first.origin, ForecastOrigin::Live);
    assert_eq!(controller.current_screen(), ScreenId::RashifalDetail);
    controller.go_back();

    let second = h.flows.open_daily_forecast(ZodiacSign::Leo.into()).await.unwrap();
    assert_eq!(second.origin, ForecastOrigin::Cached);
    assert_eq!(second.text, first.text);
    assert_eq!(h.fetcher.calls.load(Ordering::SeqCst), 1);

    controller.go_back();
    h.clock.advance(chrono::Duration::days(1));
    let next_day = h.flows.open_daily_forecast(ZodiacSign::Leo.into()).await.unwrap();
    assert_eq!(next_day.origin, ForecastOrigin::Live);
    assert_eq!(h.fetcher.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn root_back_needs_two_presses() {
    let h = onboarded(FakeGateway::offline()).await;

    assert_eq!(h.flows.back_gesture(None), BackOutcome::ExitSuppressed);
    let toasts = h.notifier.toasts();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].message, EXIT_HINT);
    assert_eq!(toasts[0].duration_ms, 2_000);

    h.clock.advance_millis(500);
    assert_eq!(h.flows.back_gesture(None), BackOutcome::ExitAllowed);

    h.clock.advance_millis(3_000);
    assert_eq!(h.flows.back_gesture(None), BackOutcome::ExitSuppressed);
}

#[tokio::test(start_paused = true)]
async fn leaving_the_screen_drops_a_late_horoscope() {
    let h = onboarded(FakeGateway::slow(
        r#"{"overall": "Bright skies."}"#,
        Duration::from_millis(500),
    ))
    .await;
    let controller = h.flows.controller();
    controller.navigate(ScreenId::Horoscope, None);

    let (horoscope, _) = tokio::join!(h.flows.request_horoscope(ZodiacSign::Leo), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        controller.go_back();
    });

    assert!(horoscope.is_none());
    assert_eq!(controller.current_screen(), ScreenId::Home);
    assert!(h.notifier.toasts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn double_tap_sends_one_request() {
    let gateway = FakeGateway::slow(r#"{"overall": "Bright skies."}"#, Duration::from_millis(200));
    let h = onboarded(gateway.clone()).await;
    h.flows.controller().navigate(ScreenId::Horoscope, None);

    let (first, second) = tokio::join!(
        h.flows.request_horoscope(ZodiacSign::Leo),
        h.flows.request_horoscope(ZodiacSign::Leo)
    );
    assert!(first.is_some() ^ second.is_some());
    assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.flows.controller().current_screen(), ScreenId::HoroscopeDetail);
}

#[tokio::test]
async fn chat_failure_uses_canned_reply() {
    let h = onboarded(FakeGateway::offline()).await;
    h.flows.controller().navigate(ScreenId::Chat, None);

    let reply = h.flows.send_chat_message("Will I find my path?").await.unwrap();
    assert_eq!(reply.content, CONNECTION_DISRUPTED_REPLY);
    assert_eq!(h.notifier.toasts()[0].message, CONNECTION_FAILED);

    let transcript = h.flows.chat_transcript().await;
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0].role, ChatRole::User);
    assert_eq!(transcript[0].content, "Will I find my path?");

    assert!(h.flows.send_chat_message("   ").await.is_none());

    h.flows.clear_chat().await;
    assert!(h.flows.chat_transcript().await.is_empty());
}

#[tokio::test]
async fn disabled_feature_shows_warning() {
    let features = FeatureFlags {
        palm_reading: false,
        ..FeatureFlags::default()
    };
    let h = harness_with(Arc::new(MemoryStore::new()), FakeGateway::offline(), features);

    assert!(h.flows.analyze_palm(&[1, 2, 3], "image/jpeg", Hand::Right).await.is_none());
    let toasts = h.notifier.toasts();
    assert_eq!(toasts[0].kind, ToastKind::Warning);
    assert_eq!(toasts[0].message, FEATURE_DISABLED);
}

#[tokio::test]
async fn unsupported_palm_image_is_rejected_before_the_gateway() {
    let gateway = FakeGateway::offline();
    let h = onboarded(gateway.clone()).await;
    h.flows.controller().navigate(ScreenId::PalmScan, None);

    assert!(h.flows.analyze_palm(&[0u8; 16], "image/heic", Hand::Left).await.is_none());
    assert_eq!(h.notifier.count_of(ToastKind::Warning), 1);
    assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.flows.controller().current_screen(), ScreenId::PalmScan);
}

#[tokio::test]
async fn palm_reading_is_recorded_and_opens_result() {
    let h = onboarded(FakeGateway::replying(PALM_REPLY)).await;
    let controller = h.flows.controller();
    controller.navigate(ScreenId::PalmScan, None);

    let reading = h
        .flows
        .analyze_palm(&palm_photo(), "image/png", Hand::Left)
        .await
        .unwrap();
    assert_eq!(reading.summary, "A steady, patient hand.");
    assert_eq!(reading.heart_line.kind, "Curved");
    assert_eq!(reading.life_line.advice, "Live fully");

    assert_eq!(controller.current_screen(), ScreenId::PalmResult);
    assert_eq!(controller.history_stack(), vec![ScreenId::Home, ScreenId::PalmScan]);
    let params = controller.params().unwrap();
    assert_eq!(params["hand"], "left");
    assert_eq!(params["summary"], "A steady, patient hand.");

    let history: Vec<HistoryEntry<PalmReading>> =
        h.flows.services().history.list(HistoryKind::Palm).await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].record, reading);
    assert!(h.notifier.toasts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn leaving_palm_scan_drops_the_reading() {
    let gateway = FakeGateway::slow(PALM_REPLY, Duration::from_millis(500));
    let h = onboarded(gateway.clone()).await;
    let controller = h.flows.controller();
    controller.navigate(ScreenId::PalmScan, None);

    let photo = palm_photo();
    let (reading, _) = tokio::join!(h.flows.analyze_palm(&photo, "image/png", Hand::Right), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        controller.go_back();
    });

    assert!(reading.is_none());
    assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
    assert_eq!(controller.current_screen(), ScreenId::Home);
    let history: Vec<HistoryEntry<PalmReading>> =
        h.flows.services().history.list(HistoryKind::Palm).await;
    assert!(history.is_empty());
    assert!(h.notifier.toasts().is_empty());
}

#[tokio::test]
async fn disclaimer_is_shown_until_accepted() {
    let store = Arc::new(MemoryStore::new());
    let h = onboarded_in(store.clone(), FakeGateway::offline()).await;
    assert!(h.flows.needs_disclaimer().await);

    h.flows.accept_disclaimer().await;
    assert!(!h.flows.needs_disclaimer().await);
    assert_eq!(h.flows.controller().current_screen(), ScreenId::Home);

    let restarted = harness_with(store, FakeGateway::offline(), FeatureFlags::default());
    assert!(!restarted.flows.needs_disclaimer().await);

    h.flows.delete_my_data().await;
    assert!(h.flows.needs_disclaimer().await);
}

#[tokio::test]
async fn delete_my_data_restarts_onboarding() {
    let h = onboarded(FakeGateway::offline()).await;
    h.flows.controller().navigate(ScreenId::Settings, None);

    h.flows.delete_my_data().await;
    assert_eq!(h.flows.controller().current_screen(), ScreenId::Language);
    assert!(h.flows.controller().history_stack().is_empty());
    assert!(h.store.is_empty().await);
    assert!(!h.flows.services().profiles.profile().await.onboarding_complete());

    // Nothing behind the language picker to back out to.
    assert_eq!(h.flows.back_gesture(None), BackOutcome::ExitSuppressed);
    assert_eq!(h.flows.controller().current_screen(), ScreenId::Language);

    let restarted = harness_with(h.store.clone(), FakeGateway::offline(), FeatureFlags::default());
    assert_eq!(
        restarted.flows.start().await,
        Some(InitialRoute::LanguageThenOnboarding)
    );
}
