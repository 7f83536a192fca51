/*!

This is the long-form manual for `survey_analytics` and `surveydash`.

## Input formats

The following formats are supported by `surveydash`:
* `xlsx` (also `xls` and `ods`) spreadsheets
* `csv` Comma Separated Values with a header row
* `sample` generated demonstration data

All the formats are read as one row per response. The first row of the file is
the header. The recognized columns are:

| column                   | content                                                  |
|--------------------------|----------------------------------------------------------|
| `Date` or `Timestamp`    | date of the response (date cell, serial number or text)  |
| `Customer ID`            | identifier of the customer                               |
| `Food Quality`           | rating from 1 to 5                                       |
| `Service Quality`        | rating from 1 to 5                                       |
| `Hygiene`                | rating from 1 to 5                                       |
| `Value for Money`        | rating from 1 to 5                                       |
| `Overall Satisfaction`   | free text, see below                                     |
| `Comments`               | free text                                                |
| `NPS Score`              | likelihood to recommend, from 0 to 10                    |

Other columns are ignored. When a header does not match exactly, it is matched
loosely: any header containing `date` or `timestamp` is a date, `customer` and
`id` is the customer id, `food` and `quality` is the food quality, and so on.

No cell can make a file fail to load. Values that cannot be understood are
replaced:
- a rating that is not a number becomes 3, numbers are clamped to [1, 5]
- a missing date becomes the time of loading, an invalid one is kept as an
  unknown date (these responses are excluded by the date filters)
- a missing customer id becomes `CUST<number>`
- a missing NPS score is drawn from the range that matches the overall
  satisfaction (9-10 for `Highly Satisfied` down to 0-1 for `Highly Dissatisfied`)

### Overall satisfaction

The text is matched without regard to case, in this order:

1. contains `highly satisfied`, `excellent` or `very satisfied`: **Highly Satisfied**
2. contains `highly dissatisfied`, `terrible` or `very poor`: **Highly Dissatisfied**
3. contains `dissatisfied` or `poor`: **Dissatisfied**
4. contains `satisfied` or `good`: **Satisfied**
5. anything else: **Neutral**

### csv

```text
Date,Customer ID,Food Quality,Service Quality,Hygiene,Value for Money,Overall Satisfaction,Comments,NPS Score
2024-05-02,C001,5,4,5,4,Highly Satisfied,Great evening,10
2024-05-03,C002,2,3,4,2,Dissatisfied,,4
```

## Filters

- date range: `all`, `last-30`, `last-90`, `last-year`, counted back from now
  (or from the `--now` option)
- rating: `all` or a satisfaction level written in any case, with dashes or
  spaces (`highly-satisfied`, `Highly Satisfied`)

## Configuration

`surveydash` accepts a configuration file in JSON. All the entries are optional.
Command line flags take precedence over the file.

```json
{
  "outputSettings": { "dashboardName": "Downtown", "outputPath": "summary.json" },
  "dataSources": [
    { "provider": "xlsx", "filePath": "responses.xlsx", "excelWorksheetName": "Form1" }
  ],
  "sampleData": { "count": 150, "seed": 42 },
  "filters": { "dateRange": "last-90", "rating": "all" }
}
```

Paths are relative to the directory of the configuration file. When several data
sources are listed, their rows are concatenated. If any of them cannot be read,
nothing is loaded. Without data source, sample data is generated.

## Output

The summary is written in JSON. Statistics that cannot be computed because no
response matches the filters are written as `null`.

 */
