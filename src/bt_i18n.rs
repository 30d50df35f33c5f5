// Localization table for BelloTreno
//
// One table keyed by (language, message key). Every formatter and classifier
// receives the active `Lang` and looks its phrases up here.

use crate::bt_config::Lang;
use lazy_static::lazy_static;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MsgKey {
    // Notices
    EnterValidTrainNumber,
    TrainNotFound,
    SearchFailed,
    DetailsFailed,
    NoRealtimeData,
    EnterStationName,
    NoStationFound,
    BoardFailed,
    FeedFailed,
    NoInfoFound,
    ReadMore,
    SelectStation,
    SelectTrain,

    // Rejected input
    UnsupportedLanguage,
    UnsupportedTheme,
    UnknownFeedMode,
    UnknownRegion,
    UnknownBoardType,
    InvalidLink,

    // Upstream status phrase substitutions
    StatusNotDeparted,
    StatusEarlyBy,
    StatusDelayedBy,
    StatusOnTime,

    // Board statuses
    BoardCancelled,
    BoardNotDeparted,
    BoardDelayed,
    BoardEarly,
    BoardOnTime,
    Minutes,

    // Labels
    Expected,
    Arrival,
    Departure,
    StopDuration,
    Platform,
    TrainNum,
    Duration,
    LastPosition,
    InHead,
    InTail,
    DepartDate,
    OriginStation,
    Departures,
    Arrivals,
    Destination,
    Origin,
    Status,
    Time,
    RecentSearches,
    NoRecentSearches,
    Announcements,
    Updates,
    Notices,
    ThemeAuto,
    ThemeLight,
    ThemeDark,
    LanguageName,
    NotAvailable,
}

type Table = HashMap<(Lang, MsgKey), &'static str>;

fn insert_all(table: &mut Table, lang: Lang, pairs: &[(MsgKey, &'static str)]) {
    for (key, text) in pairs {
        table.insert((lang, *key), *text);
    }
}

lazy_static! {
    static ref TABLE: Table = {
        use MsgKey::*;
        let mut table = HashMap::new();

        insert_all(&mut table, Lang::Zh, &[
            (EnterValidTrainNumber, "请输入有效的车次号"),
            (TrainNotFound, "未找到该车次"),
            (SearchFailed, "搜索失败"),
            (DetailsFailed, "详情加载失败"),
            (NoRealtimeData, "该班次暂无实时数据（可能已过期或尚未生成）"),
            (EnterStationName, "请输入车站名"),
            (NoStationFound, "未找到车站"),
            (BoardFailed, "车站看板加载失败"),
            (FeedFailed, "公告加载失败"),
            (NoInfoFound, "暂无相关信息"),
            (ReadMore, "阅读全文"),
            (SelectStation, "选择车站："),
            (SelectTrain, "选择车次："),
            (UnsupportedLanguage, "不支持的语言（可选：zh、en、it）"),
            (UnsupportedTheme, "不支持的主题（可选：auto、light、dark）"),
            (UnknownFeedMode, "未知的公告类型（可选：updates、notices）"),
            (UnknownRegion, "未知的地区"),
            (UnknownBoardType, "未知的看板类型（可选：partenze、arrivi）"),
            (InvalidLink, "无法打开该链接"),
            (StatusNotDeparted, "未出发"),
            (StatusEarlyBy, "提前"),
            (StatusDelayedBy, "晚点"),
            (StatusOnTime, "准点"),
            (BoardCancelled, "已取消"),
            (BoardNotDeparted, "未出发"),
            (BoardDelayed, "晚点"),
            (BoardEarly, "提前"),
            (BoardOnTime, "准点"),
            (Minutes, "分钟"),
            (Expected, "计划"),
            (Arrival, "到达"),
            (Departure, "出发"),
            (StopDuration, "停留"),
            (Platform, "站台"),
            (TrainNum, "车次"),
            (Duration, "时长"),
            (LastPosition, "最后位置"),
            (InHead, "在车头"),
            (InTail, "在车尾"),
            (DepartDate, "出发日期"),
            (OriginStation, "始发站"),
            (Departures, "离站"),
            (Arrivals, "到站"),
            (Destination, "终点"),
            (Origin, "始发"),
            (Status, "状态"),
            (Time, "时间"),
            (RecentSearches, "最近搜索"),
            (NoRecentSearches, "暂无搜索记录"),
            (Announcements, "实时公告"),
            (Updates, "动态"),
            (Notices, "通知"),
            (ThemeAuto, "跟随系统"),
            (ThemeLight, "浅色"),
            (ThemeDark, "深色"),
            (LanguageName, "中文"),
            (NotAvailable, "N/A"),
        ]);

        insert_all(&mut table, Lang::En, &[
            (EnterValidTrainNumber, "Please enter a valid train number"),
            (TrainNotFound, "Train not found"),
            (SearchFailed, "Search failed"),
            (DetailsFailed, "Failed to load details"),
            (NoRealtimeData, "No real-time data for this train (may be expired or not yet generated)"),
            (EnterStationName, "Please enter station name"),
            (NoStationFound, "No station found"),
            (BoardFailed, "Failed to load station board"),
            (FeedFailed, "Failed to load announcements"),
            (NoInfoFound, "No information found"),
            (ReadMore, "Read more"),
            (SelectStation, "Select station:"),
            (SelectTrain, "Select train:"),
            (UnsupportedLanguage, "Unsupported language (zh, en, it)"),
            (UnsupportedTheme, "Unsupported theme (auto, light, dark)"),
            (UnknownFeedMode, "Unknown announcement type (updates, notices)"),
            (UnknownRegion, "Unknown region"),
            (UnknownBoardType, "Unknown board type (partenze, arrivi)"),
            (InvalidLink, "Cannot open this link"),
            (StatusNotDeparted, "Not Departed"),
            (StatusEarlyBy, "Early by"),
            (StatusDelayedBy, "Delayed by"),
            (StatusOnTime, "On Time"),
            (BoardCancelled, "CANCELLED"),
            (BoardNotDeparted, "Not Departed"),
            (BoardDelayed, "Delayed"),
            (BoardEarly, "Early"),
            (BoardOnTime, "On Time"),
            (Minutes, "min"),
            (Expected, "Expected"),
            (Arrival, "Arrival"),
            (Departure, "Departure"),
            (StopDuration, "Stop"),
            (Platform, "Platform"),
            (TrainNum, "Train"),
            (Duration, "Duration"),
            (LastPosition, "Last position"),
            (InHead, "in head"),
            (InTail, "in tail"),
            (DepartDate, "Departure date"),
            (OriginStation, "Origin"),
            (Departures, "Departures"),
            (Arrivals, "Arrivals"),
            (Destination, "Destination"),
            (Origin, "Origin"),
            (Status, "Status"),
            (Time, "Time"),
            (RecentSearches, "Recent searches"),
            (NoRecentSearches, "No recent searches"),
            (Announcements, "Service announcements"),
            (Updates, "Updates"),
            (Notices, "Notices"),
            (ThemeAuto, "Auto"),
            (ThemeLight, "Light"),
            (ThemeDark, "Dark"),
            (LanguageName, "English"),
            (NotAvailable, "N/A"),
        ]);

        insert_all(&mut table, Lang::It, &[
            (EnterValidTrainNumber, "Inserire un numero di treno valido"),
            (TrainNotFound, "Treno non trovato"),
            (SearchFailed, "Ricerca fallita"),
            (DetailsFailed, "Impossibile caricare i dettagli"),
            (NoRealtimeData, "Nessun dato in tempo reale per questo treno (potrebbe essere scaduto o non ancora generato)"),
            (EnterStationName, "Inserire il nome della stazione"),
            (NoStationFound, "Nessuna stazione trovata"),
            (BoardFailed, "Impossibile caricare il tabellone"),
            (FeedFailed, "Impossibile caricare gli avvisi"),
            (NoInfoFound, "Nessuna informazione trovata"),
            (ReadMore, "Leggi tutto"),
            (SelectStation, "Seleziona stazione:"),
            (SelectTrain, "Seleziona treno:"),
            (UnsupportedLanguage, "Lingua non supportata (zh, en, it)"),
            (UnsupportedTheme, "Tema non supportato (auto, light, dark)"),
            (UnknownFeedMode, "Tipo di avviso sconosciuto (updates, notices)"),
            (UnknownRegion, "Regione sconosciuta"),
            (UnknownBoardType, "Tipo di tabellone sconosciuto (partenze, arrivi)"),
            (InvalidLink, "Impossibile aprire il collegamento"),
            (StatusNotDeparted, "non partito"),
            (StatusEarlyBy, "con un anticipo di"),
            (StatusDelayedBy, "con un ritardo di"),
            (StatusOnTime, "in orario"),
            (BoardCancelled, "CANCELLATO"),
            (BoardNotDeparted, "Non partito"),
            (BoardDelayed, "Ritardo"),
            (BoardEarly, "In anticipo"),
            (BoardOnTime, "In orario"),
            (Minutes, "min"),
            (Expected, "Previsto"),
            (Arrival, "Arrivo"),
            (Departure, "Partenza"),
            (StopDuration, "Sosta"),
            (Platform, "Binario"),
            (TrainNum, "Treno"),
            (Duration, "Durata"),
            (LastPosition, "Ultimo rilevamento"),
            (InHead, "in testa"),
            (InTail, "in coda"),
            (DepartDate, "Data di partenza"),
            (OriginStation, "Stazione di origine"),
            (Departures, "Partenze"),
            (Arrivals, "Arrivi"),
            (Destination, "Destinazione"),
            (Origin, "Provenienza"),
            (Status, "Stato"),
            (Time, "Orario"),
            (RecentSearches, "Ricerche recenti"),
            (NoRecentSearches, "Nessuna ricerca recente"),
            (Announcements, "Infomobilità"),
            (Updates, "Aggiornamenti"),
            (Notices, "Avvisi"),
            (ThemeAuto, "Automatico"),
            (ThemeLight, "Chiaro"),
            (ThemeDark, "Scuro"),
            (LanguageName, "Italiano"),
            (NotAvailable, "N/D"),
        ]);

        table
    };
}

/// Look up a phrase, falling back to English when the language has no entry.
pub fn t(lang: Lang, key: MsgKey) -> &'static str {
    TABLE
        .get(&(lang, key))
        .or_else(|| TABLE.get(&(Lang::En, key)))
        .copied()
        .unwrap_or("?")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_key_has_english_text() {
        for key in [MsgKey::TrainNotFound, MsgKey::ReadMore, MsgKey::NotAvailable] {
            assert_ne!(t(Lang::En, key), "?");
        }
    }

    #[test]
    fn languages_differ_for_notices() {
        assert_eq!(t(Lang::Zh, MsgKey::TrainNotFound), "未找到该车次");
        assert_eq!(t(Lang::It, MsgKey::TrainNotFound), "Treno non trovato");
        assert_eq!(t(Lang::En, MsgKey::TrainNotFound), "Train not found");
    }

    #[test]
    fn italian_status_phrases_are_upstream_phrases() {
        assert_eq!(t(Lang::It, MsgKey::StatusDelayedBy), "con un ritardo di");
        assert_eq!(t(Lang::It, MsgKey::StatusOnTime), "in orario");
    }
}
