//! Echo recovery on synthetic damped-sinusoid fixtures

mod test_utils;

use echocheckr::core::analysis::{CepstralEngine, PeakDetector};
use echocheckr::core::dsp::{SpectralTransform, WindowFunction};
use echocheckr::core::dsp::stats::max_relative_error;
use echocheckr::{EchoConfig, Severity, SortOrder};
use test_utils::*;

#[test]
fn single_echo_recovered_within_one_sample() {
    let signal = received(&[(0.2, 0.5)]);
    let engine = CepstralEngine::default();
    let cepstrum = engine.analyze(&signal, 1000).unwrap();
    let echoes = PeakDetector::default().find_echoes(&cepstrum, 0.01, 0.45, 8);

    assert_eq!(echoes.len(), 1, "{:?}", echoes);
    assert_eq!(echoes[0].rank, 1);
    assert_delay_near(echoes[0].delay, 0.2, 1.0);
    // First-order cepstral peak of an echo with gain a is about a/2
    assert!((echoes[0].amplitude - 0.25).abs() < 0.02);
}

#[test]
fn single_echo_through_analyzer_reports_calibrated_estimates() {
    let analyzer = analyzer_with(EchoConfig::default());
    let report = analyzer.analyze(&received(&[(0.2, 0.5)])).unwrap();
    let result = report.classical.expect("classical result");

    assert_eq!(result.len(), 1);
    let echo = &result.echoes[0];
    assert_delay_near(echo.delay(), 0.2, 1.0);
    assert!(echo.reflection_coefficient > 0.0 && echo.reflection_coefficient <= 1.0);
    assert!((echo.attenuation_estimate - 0.5).abs() < 0.05);
    assert_eq!(echo.severity, Severity::Medium);
    assert_eq!(result.metadata.window_len, 1000);
    assert_eq!(result.metadata.transform_size, 1000);
}

#[test]
fn two_echoes_follow_requested_order() {
    // Later echo is the stronger one, so the two orders differ
    let signal = received(&[(0.1, 0.3), (0.3, 0.6)]);

    let by_strength = analyzer_with(EchoConfig::default())
        .analyze_classical(&signal)
        .unwrap();
    assert_eq!(by_strength.len(), 2);
    assert_delay_near(by_strength.echoes[0].delay(), 0.3, 1.0);
    assert_delay_near(by_strength.echoes[1].delay(), 0.1, 1.0);
    assert!(by_strength.echoes[0].strength() > by_strength.echoes[1].strength());

    let by_delay = analyzer_with(EchoConfig {
        sort_order: SortOrder::ByDelay,
        ..EchoConfig::default()
    })
    .analyze_classical(&signal)
    .unwrap();
    assert_eq!(by_delay.len(), 2);
    assert_delay_near(by_delay.echoes[0].delay(), 0.1, 1.0);
    assert_delay_near(by_delay.echoes[1].delay(), 0.3, 1.0);
    // Rank still records strength order
    assert_eq!(by_delay.echoes[0].candidate.rank, 2);
}

#[test]
fn two_echoes_stronger_first() {
    let signal = received(&[(0.1, 0.6), (0.3, 0.3)]);
    let result = analyzer_with(EchoConfig::default())
        .analyze_classical(&signal)
        .unwrap();
    let delays = result.delays();
    assert_eq!(delays.len(), 2);
    assert_delay_near(delays[0], 0.1, 1.0);
    assert_delay_near(delays[1], 0.3, 1.0);

    let map = result.echo_delay_map();
    assert!(map[0].1 > map[1].1);
}

#[test]
fn pure_signal_has_no_echoes() {
    let report = analyzer_with(EchoConfig::default())
        .analyze(&received(&[]))
        .unwrap();
    assert!(report.classical.unwrap().is_empty());
    assert_eq!(report.quantum, None);
}

#[test]
fn raising_threshold_never_adds_candidates() {
    let signal = received(&[(0.1, 0.6), (0.3, 0.3)]);
    let cepstrum = CepstralEngine::default().analyze(&signal, 1000).unwrap();

    let mut previous = usize::MAX;
    for threshold in [0.0, 0.5, 1.0, 2.0, 2.5, 3.0, 4.0, 5.0, 6.0, 8.0] {
        let count = PeakDetector::new(threshold)
            .find_echoes(&cepstrum, 0.01, 0.45, 100)
            .len();
        assert!(count <= previous, "threshold {} gave {} > {}", threshold, count, previous);
        previous = count;
    }
    assert_eq!(previous, 0);
}

#[test]
fn inverted_echo_needs_inverted_search() {
    let signal = received(&[(0.2, -0.5)]);
    let plain = analyzer_with(EchoConfig::default())
        .analyze_classical(&signal)
        .unwrap();
    assert!(plain.is_empty());

    let result = analyzer_with(EchoConfig {
        include_inverted: true,
        ..EchoConfig::default()
    })
    .analyze_classical(&signal)
    .unwrap();
    assert_eq!(result.len(), 1);
    assert!(result.echoes[0].candidate.inverted);
    assert_delay_near(result.echoes[0].delay(), 0.2, 1.0);
}

#[test]
fn spectral_round_trip_within_tolerance() {
    let transform = SpectralTransform::new();
    for signal in [received(&[(0.2, 0.5)]), received(&[])] {
        let spectrum = transform.forward(&signal, 1000).unwrap();
        let restored = transform.inverse(&spectrum).unwrap();
        assert!(max_relative_error(signal.samples(), &restored) < 1e-6);
    }
}

#[test]
fn hann_window_remains_selectable() {
    let engine = CepstralEngine::new(WindowFunction::Hann, None);
    let cepstrum = engine.analyze(&received(&[(0.2, 0.5)]), 1000).unwrap();
    assert_eq!(cepstrum.len(), 1000);
    assert!(cepstrum.values().iter().all(|v| v.is_finite()));
}
