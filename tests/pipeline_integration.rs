mod common;

use anki_vocab::application::{
    DeckGenerationService, DeckOptions, RetryPolicy, SpeechSynthesizer,
};
use anki_vocab::domain::ProgressRepository;
use anki_vocab::domain::input::{parse_words, read_words};
use anki_vocab::infrastructure::progress::TextFileProgressRepo;
use common::{EchoSynth, RecordingResolver, read_package};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn service(resolver: &RecordingResolver, progress: &Path, audio: bool) -> DeckGenerationService {
    let synth: Option<Box<dyn SpeechSynthesizer>> = if audio {
        Some(Box::new(EchoSynth))
    } else {
        None
    };
    DeckGenerationService::new(
        Box::new(resolver.clone()),
        synth,
        Box::new(TextFileProgressRepo::new(progress)),
    )
}

fn options(tmp: &TempDir, file: &str) -> DeckOptions {
    DeckOptions {
        output_path: tmp.path().join(file),
        max_sentences: 2,
        retry: RetryPolicy::immediate(2),
        ..DeckOptions::default()
    }
}

fn log_words(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .filter(|l| !l.starts_with('#') && !l.trim().is_empty())
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn hund_becomes_card_with_translation_and_example() {
    let tmp = TempDir::new().unwrap();
    let resolver = RecordingResolver::default();
    let svc = service(&resolver, &tmp.path().join("added_words.txt"), true);

    let report = svc
        .run(&parse_words("Hund\n"), &options(&tmp, "deck.apkg"))
        .await
        .unwrap();
    assert_eq!(report.created.len(), 1);

    let (notes, media) = read_package(&tmp.path().join("deck.apkg"));
    assert_eq!(notes.len(), 1);
    let fields = &notes[0].fields;
    assert_eq!(fields[0], "Hund");
    assert!(fields[1].contains("english for Hund"));
    assert!(fields[2].contains("Satz 1 mit Hund."));
    assert!(fields[2].contains("[sound:hund_ex1.mp3]"));
    assert_eq!(fields[4], "[sound:hund.mp3]");
    // German -> English と English -> German の 2 枚
    assert_eq!(notes[0].cards, 2);
    assert_eq!(media.as_object().unwrap().len(), 3);
}

/// 1 語の失敗は他の語に影響しない
#[tokio::test]
async fn one_failure_among_n_keeps_the_rest() {
    let tmp = TempDir::new().unwrap();
    let progress = tmp.path().join("added_words.txt");
    let resolver = RecordingResolver::failing_on(&["xyzzy"]);
    let svc = service(&resolver, &progress, false);

    let words = parse_words("Hund\nxyzzy\nKatze\nMaus\n");
    let report = svc.run(&words, &options(&tmp, "deck.apkg")).await.unwrap();

    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].word, "xyzzy");
    let (notes, _) = read_package(&tmp.path().join("deck.apkg"));
    let fronts: Vec<&str> = notes.iter().map(|n| n.fields[0].as_str()).collect();
    assert_eq!(fronts, vec!["Hund", "Katze", "Maus"]);

    // ログにはデッキに入った語だけ
    assert_eq!(log_words(&progress), vec!["Hund", "Katze", "Maus"]);
}

#[tokio::test]
async fn logged_words_are_not_resolved_again() {
    let tmp = TempDir::new().unwrap();
    let progress = tmp.path().join("added_words.txt");
    fs::write(&progress, "# earlier.apkg\nHund\n").unwrap();
    let resolver = RecordingResolver::default();
    let svc = service(&resolver, &progress, false);

    svc.run(&parse_words("Hund\nKatze\n"), &options(&tmp, "deck.apkg"))
        .await
        .unwrap();

    assert_eq!(resolver.calls(), vec!["Katze"]);
    assert_eq!(log_words(&progress), vec!["Hund", "Katze"]);
}

/// 同じ入力で 2 回実行しても 2 回目は何もしない
#[tokio::test]
async fn second_run_is_a_no_op() {
    let tmp = TempDir::new().unwrap();
    let progress = tmp.path().join("added_words.txt");
    let input = tmp.path().join("new_words.txt");
    fs::write(&input, "Hund\n\nKatze\nHund\n").unwrap();
    let resolver = RecordingResolver::default();
    let svc = service(&resolver, &progress, false);

    let words = read_words(&input).unwrap();
    let first = svc.run(&words, &options(&tmp, "first.apkg")).await.unwrap();
    assert_eq!(first.logged, vec!["Hund", "Katze"]);
    let log_after_first = fs::read_to_string(&progress).unwrap();

    let second = svc.run(&words, &options(&tmp, "second.apkg")).await.unwrap();
    assert!(second.is_noop());
    assert_eq!(second.already_processed, 2);
    assert!(!tmp.path().join("second.apkg").exists());
    assert_eq!(fs::read_to_string(&progress).unwrap(), log_after_first);
    assert_eq!(resolver.calls(), vec!["Hund", "Katze"]);
}

#[tokio::test]
async fn empty_lines_never_reach_resolver() {
    let tmp = TempDir::new().unwrap();
    let resolver = RecordingResolver::default();
    let svc = service(&resolver, &tmp.path().join("added_words.txt"), false);

    svc.run(&parse_words("\n   \nHund\n\t\n"), &options(&tmp, "deck.apkg"))
        .await
        .unwrap();
    assert_eq!(resolver.calls(), vec!["Hund"]);
}

/// デッキを書けなかった場合は何も記録しない
#[tokio::test]
async fn failed_deck_write_marks_nothing() {
    let tmp = TempDir::new().unwrap();
    let progress = tmp.path().join("added_words.txt");
    let resolver = RecordingResolver::default();
    let svc = service(&resolver, &progress, false);

    let opts = DeckOptions {
        output_path: tmp.path().join("missing_dir").join("deck.apkg"),
        ..options(&tmp, "unused.apkg")
    };
    let err = svc.run(&parse_words("Hund"), &opts).await.unwrap_err();
    assert!(err.is_fatal());
    assert!(TextFileProgressRepo::new(&progress).load().unwrap().is_empty());
}

#[tokio::test]
async fn all_failures_write_no_deck() {
    let tmp = TempDir::new().unwrap();
    let progress = tmp.path().join("added_words.txt");
    let resolver = RecordingResolver::failing_on(&["Hund"]);
    let svc = service(&resolver, &progress, false);

    let report = svc
        .run(&parse_words("Hund"), &options(&tmp, "deck.apkg"))
        .await
        .unwrap();
    assert!(report.is_noop());
    assert!(!tmp.path().join("deck.apkg").exists());
    assert!(!progress.exists());
}

/// サービスエラーは上限まで再試行され、その語だけがスキップされる
#[tokio::test]
async fn unavailable_service_is_retried_then_skipped() {
    let tmp = TempDir::new().unwrap();
    let progress = tmp.path().join("added_words.txt");
    let resolver = RecordingResolver::unavailable_on(&["Katze"]);
    let svc = service(&resolver, &progress, false);
    let opts = DeckOptions {
        retry: RetryPolicy::immediate(3),
        ..options(&tmp, "deck.apkg")
    };

    let report = svc
        .run(&parse_words("Hund\nKatze\nMaus\n"), &opts)
        .await
        .unwrap();

    let katze_calls = resolver.calls().iter().filter(|w| *w == "Katze").count();
    assert_eq!(katze_calls, 3);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].word, "Katze");
    assert!(report.skipped[0].reason.contains("529"));

    let (notes, _) = read_package(&tmp.path().join("deck.apkg"));
    let fronts: Vec<&str> = notes.iter().map(|n| n.fields[0].as_str()).collect();
    assert_eq!(fronts, vec!["Hund", "Maus"]);
    assert_eq!(log_words(&progress), vec!["Hund", "Maus"]);
}

/// 同じ見出し語に解決された語は 2 枚目のカードを作らない
#[tokio::test]
async fn same_headword_makes_one_card() {
    let tmp = TempDir::new().unwrap();
    let progress = tmp.path().join("added_words.txt");
    let resolver = RecordingResolver::default();
    let svc = service(&resolver, &progress, false);

    let report = svc
        .run(&parse_words("hund\nHund\nKatze\n"), &options(&tmp, "deck.apkg"))
        .await
        .unwrap();

    assert_eq!(report.created.len(), 2);
    assert_eq!(report.duplicates.len(), 1);
    assert_eq!(report.duplicates[0].word, "Hund");

    let (notes, _) = read_package(&tmp.path().join("deck.apkg"));
    assert_eq!(notes.len(), 2);
    let guids: std::collections::HashSet<&str> = notes.iter().map(|n| n.guid.as_str()).collect();
    assert_eq!(guids.len(), 2);

    // 重複した語もカードがあるので記録される
    assert_eq!(log_words(&progress), vec!["hund", "Katze", "Hund"]);
}
