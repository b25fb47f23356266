//! GraphQL documents for the exchange, blocks and health subgraphs.
//!
//! Historical documents embed the block number directly (`block: { number: N }`)
//! so that one document equals one point in time; everything else is passed
//! through variables.

/// Selection shared by every pair query.
pub const PAIR_FIELDS: &str = r#"
fragment PairFields on Pair {
  id
  txCount
  token0 {
    id
    symbol
    name
    totalLiquidity
    derivedETH
  }
  token1 {
    id
    symbol
    name
    totalLiquidity
    derivedETH
  }
  reserve0
  reserve1
  reserveUSD
  totalSupply
  trackedReserveETH
  reserveETH
  volumeUSD
  untrackedVolumeUSD
  token0Price
  token1Price
  createdAtTimestamp
  createdAtBlockNumber
}
"#;

/// Maximum entities returned by one bulk pair lookup.
pub const PAIRS_BULK_LIMIT: usize = 500;

/// Page size for daily snapshot collections.
pub const DAY_DATA_PAGE_SIZE: usize = 1000;

fn block_arg(block: Option<u64>) -> String {
    match block {
        Some(number) => format!(", block: {{ number: {number} }}"),
        None => String::new(),
    }
}

/// Current state of every pair in `$allPairs`.
pub fn pairs_bulk() -> String {
    format!(
        r#"{PAIR_FIELDS}
query pairsBulk($allPairs: [Bytes]!) {{
  pairs(first: {PAIRS_BULK_LIMIT}, where: {{ id_in: $allPairs }}, orderBy: trackedReserveETH, orderDirection: desc) {{
    ...PairFields
  }}
}}"#
    )
}

/// State of every pair in `$allPairs` as of `block`.
pub fn pairs_historical_bulk(block: u64) -> String {
    format!(
        r#"{PAIR_FIELDS}
query pairsHistoricalBulk($allPairs: [Bytes]!) {{
  pairs(first: {PAIRS_BULK_LIMIT}, where: {{ id_in: $allPairs }}, block: {{ number: {block} }}, orderBy: trackedReserveETH, orderDirection: desc) {{
    ...PairFields
  }}
}}"#
    )
}

/// The `$first` pairs with the deepest tracked liquidity.
pub fn top_pairs() -> String {
    format!(
        r#"{PAIR_FIELDS}
query topPairs($first: Int!) {{
  pairs(first: $first, orderBy: trackedReserveETH, orderDirection: desc) {{
    ...PairFields
  }}
}}"#
    )
}

/// A single pair (`$pairAddress`), optionally as of a block.
pub fn pair_at_block(block: Option<u64>) -> String {
    format!(
        r#"{PAIR_FIELDS}
query pairAtBlock($pairAddress: Bytes!) {{
  pairs(where: {{ id: $pairAddress }}{}) {{
    ...PairFields
  }}
}}"#,
        block_arg(block)
    )
}

/// The factory aggregate (`$factory`), optionally as of a block.
pub fn factory_at_block(block: Option<u64>) -> String {
    format!(
        r#"query factoryAtBlock($factory: ID!) {{
  uniswapFactories(where: {{ id: $factory }}{}) {{
    id
    totalVolumeUSD
    totalVolumeETH
    untrackedVolumeUSD
    totalLiquidityUSD
    totalLiquidityETH
    txCount
    pairCount
  }}
}}"#,
        block_arg(block)
    )
}

/// ETH/USD price bundle, optionally as of a block.
pub fn eth_price_at_block(block: Option<u64>) -> String {
    format!(
        r#"query ethPrice {{
  bundles(where: {{ id: "1" }}{}) {{
    id
    ethPrice
  }}
}}"#,
        block_arg(block)
    )
}

pub const GLOBAL_CHART: &str = r#"
query globalChart($startTime: Int!, $skip: Int!) {
  uniswapDayDatas(first: 1000, skip: $skip, where: { date_gt: $startTime }, orderBy: date, orderDirection: asc) {
    id
    date
    totalVolumeUSD
    dailyVolumeUSD
    dailyVolumeETH
    totalLiquidityUSD
    totalLiquidityETH
  }
}
"#;

pub const PAIR_CHART: &str = r#"
query pairChart($pairAddress: Bytes!, $skip: Int!) {
  pairDayDatas(first: 1000, skip: $skip, orderBy: date, orderDirection: asc, where: { pairAddress: $pairAddress }) {
    id
    date
    dailyVolumeToken0
    dailyVolumeToken1
    dailyVolumeUSD
    reserveUSD
  }
}
"#;

pub const PAIR_TRANSACTIONS: &str = r#"
query pairTransactions($allPairs: [Bytes]!) {
  mints(first: 100, where: { pair_in: $allPairs }, orderBy: timestamp, orderDirection: desc) {
    transaction {
      id
      timestamp
    }
    pair {
      token0 {
        id
        symbol
      }
      token1 {
        id
        symbol
      }
    }
    to
    liquidity
    amount0
    amount1
    amountUSD
  }
  burns(first: 100, where: { pair_in: $allPairs }, orderBy: timestamp, orderDirection: desc) {
    transaction {
      id
      timestamp
    }
    pair {
      token0 {
        id
        symbol
      }
      token1 {
        id
        symbol
      }
    }
    sender
    liquidity
    amount0
    amount1
    amountUSD
  }
  swaps(first: 100, where: { pair_in: $allPairs }, orderBy: timestamp, orderDirection: desc) {
    id
    transaction {
      id
      timestamp
    }
    pair {
      token0 {
        id
        symbol
      }
      token1 {
        id
        symbol
      }
    }
    amount0In
    amount0Out
    amount1In
    amount1Out
    amountUSD
    to
  }
}
"#;

pub const TOP_LPS_PER_PAIR: &str = r#"
query topLpsPerPair($pair: Bytes!) {
  liquidityPositions(where: { pair: $pair }, orderBy: liquidityTokenBalance, orderDirection: desc, first: 10) {
    user {
      id
    }
    pair {
      id
      totalSupply
      reserveUSD
      token0 {
        id
        symbol
      }
      token1 {
        id
        symbol
      }
    }
    liquidityTokenBalance
  }
}
"#;

pub const BLOCK_AFTER: &str = r#"
query blockAfter($timestampFrom: Int!, $timestampTo: Int!) {
  blocks(first: 1, orderBy: timestamp, orderDirection: asc, where: { timestamp_gt: $timestampFrom, timestamp_lt: $timestampTo }) {
    id
    number
    timestamp
  }
}
"#;

/// Body of one aliased sub-query looking up the first block in `(from, to)`.
pub fn block_in_window(from: i64, to: i64) -> String {
    format!(
        "blocks(first: 1, orderBy: timestamp, orderDirection: asc, where: {{ timestamp_gt: {from}, timestamp_lt: {to} }}) {{ number timestamp }}"
    )
}

pub const INDEXING_STATUS: &str = r#"
query indexingStatus($subgraphName: String!) {
  indexingStatusForCurrentVersion(subgraphName: $subgraphName) {
    synced
    health
    chains {
      chainHeadBlock {
        number
      }
      latestBlock {
        number
      }
    }
  }
}
"#;
